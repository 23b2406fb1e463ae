fn main() {
    println!("cargo:rerun-if-env-changed=TOUCHSYNTH_CONFIG_JSON");

    // Host builds (tests, simulation) have no ESP-IDF sysenv to export.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
