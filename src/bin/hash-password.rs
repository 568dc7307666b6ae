//! Prints a bcrypt hash for the fallback admin login.
//!
//! Reads the password from the first argument, or from stdin when none is given.

use bcrypt::{hash, DEFAULT_COST};
use std::env;
use std::io::{self, BufRead};

fn read_password() -> Option<String> {
    if let Some(arg) = env::args().nth(1) {
        return Some(arg);
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let trimmed = line.trim_end_matches(['\r', '\n']).to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn main() {
    let Some(password) = read_password() else {
        eprintln!("Usage: hash-password <PASSWORD>   (or pipe it on stdin)");
        std::process::exit(1);
    };

    if password.chars().count() < 8 {
        eprintln!("Password must be at least 8 characters");
        std::process::exit(1);
    }

    let cost = env::var("BCRYPT_COST")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_COST);

    match hash(&password, cost) {
        Ok(hashed) => {
            println!("Cost : {}", cost);
            println!("Hash : {}\n", hashed);
            println!("# Add this to the backend .env:");
            println!("ADMIN_HASH_PASSWORD={}", hashed);
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
