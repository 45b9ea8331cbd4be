use std::env;

use ppmp::constants::envvars;

// Runs before the logger exists; stdout carries payloads, so report on stderr
pub fn load_dotenv() {
    if dotenv::dotenv().is_ok() {
        eprintln!("Loaded local .env")
    }
    // Also load an explicitly named env file
    if let Ok(env_file) = env::var(envvars::ENV_FILE) {
        if dotenv::from_path(&env_file).is_ok() {
            eprintln!("Loaded {env_file}");
        }
    }
}
