#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use rpki_validation::repository::{
    Cert, CmsSignedObject, GhostbustersRecord, OpaqueContent,
};
use rpki_validation::repository::x509::Time;
use rpki_validation::validation::ValidationOptions;

fuzz_target!(|data: &[u8]| {
    let (which, data) = match data.split_first() {
        Some((first, data)) => (*first, data),
        None => return,
    };
    let bytes = Bytes::copy_from_slice(data);
    let options = ValidationOptions::at(Time::utc(2027, 1, 1, 0, 0, 0))
        .with_strict(which & 0x80 != 0);

    match which % 3 {
        0 => { let _ = Cert::decode(data); },
        1 => {
            let _ = CmsSignedObject::<OpaqueContent>::parse(
                "fuzz", bytes, &options
            );
        }
        2 => {
            let _ = CmsSignedObject::<GhostbustersRecord>::parse(
                "fuzz", bytes, &options
            );
        }
        _ => panic!("what?"),
    }
});
