//! Prints the content of a resource certificate.

use std::{env, fs, process};
use rpki_validation::repository::cert::Cert;


fn main() {
    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            println!("Usage: readcer <path>");
            process::exit(2)
        }
    };
    let data = match fs::read(&path) {
        Ok(data) => data,
        Err(err) => {
            println!("Can’t read file: {}", err);
            process::exit(2)
        }
    };
    let cert = match Cert::decode(data.as_ref()) {
        Ok(cert) => cert,
        Err(err) => {
            println!("Can’t decode cert: {}", err);
            process::exit(1)
        }
    };

    println!("Serial:    {}", cert.serial_number());
    println!("Issuer:    {}", cert.issuer());
    println!("Subject:   {}", cert.subject());
    println!("Validity:  {} to {}",
        cert.validity().not_before(), cert.validity().not_after()
    );
    println!("Type:      {}",
        if cert.is_root() { "trust anchor" }
        else if cert.is_ca() { "CA" }
        else { "EE" }
    );
    if let Some(ski) = cert.subject_key_identifier() {
        println!("SKI:       {}", ski);
    }
    if let Some(aki) = cert.authority_key_identifier() {
        println!("AKI:       {}", aki);
    }
    for uri in cert.crl_distribution_points() {
        println!("CRL:       {}", uri);
    }
    let access = [
        ("CA issuer", cert.ca_issuer_uri()),
        ("Repository", cert.repository_uri()),
        ("Manifest", cert.manifest_uri()),
        ("RRDP", cert.rrdp_notify_uri()),
        ("Object", cert.signed_object_uri()),
    ];
    for (label, uri) in access {
        if let Some(uri) = uri {
            println!("{:<10} {}", format!("{}:", label), uri);
        }
    }
    match cert.resources() {
        Some(resources) => println!("Resources: {}", resources),
        None => println!("Resources: none"),
    }
}
