//! Reads `.env` (searched upwards from the crate) and passes the monitor
//! settings to the firmware as compile-time environment variables.

const KEYS: [&str; 5] = [
    "PCMON_WIFI_SSID",
    "PCMON_WIFI_PASSWORD",
    "PCMON_UDP_PORT",
    "PCMON_SLEEP_AFTER_SECS",
    "PCMON_WIRELESS_MODE",
];

fn main() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");

    match dotenvy::dotenv() {
        Ok(path) => println!("cargo:rerun-if-changed={}", path.display()),
        Err(e) => println!("cargo:warning=no .env loaded ({e}), using defaults"),
    }

    for key in KEYS {
        println!("cargo:rerun-if-env-changed={key}");
        if let Ok(value) = std::env::var(key) {
            println!("cargo:rustc-env={key}={value}");
        }
    }
}
