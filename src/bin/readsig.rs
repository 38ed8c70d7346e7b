//! Parses a signed object and prints the validation log.
//!
//! The object is only checked by itself. Its certificate is not validated
//! against an issuer. Exits with status 1 if any check failed.

use std::{env, fs, process};
use bytes::Bytes;
use rpki_validation::repository::content::OpaqueContent;
use rpki_validation::repository::sigobj::CmsSignedObject;
use rpki_validation::validation::ValidationOptions;


fn main() {
    let mut path = None;
    let mut strict = false;
    for arg in env::args().skip(1) {
        if arg == "--strict" {
            strict = true
        }
        else if path.is_none() {
            path = Some(arg)
        }
        else {
            path = None;
            break
        }
    }
    let path = match path {
        Some(path) => path,
        None => {
            println!("Usage: readsig [--strict] <path>");
            process::exit(2)
        }
    };
    let data = match fs::read(&path) {
        Ok(data) => Bytes::from(data),
        Err(err) => {
            println!("Can’t read file: {}", err);
            process::exit(2)
        }
    };

    let (object, log) = CmsSignedObject::<OpaqueContent>::parse(
        &path, data, &ValidationOptions::default().with_strict(strict)
    );
    for record in log.records() {
        println!("{}", record);
    }
    if let Some(object) = object {
        println!();
        println!("Content type: {}", object.content_type());
        println!("Signing time: {}", object.signing_time());
        println!("EE cert:      {}", object.cert().subject());
    }
    if log.has_failures() {
        process::exit(1)
    }
}
