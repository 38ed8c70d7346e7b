//! Configuration of a validation run.

use bcder::Mode;
use crate::repository::x509::Time;


//------------ ValidationOptions ---------------------------------------------

/// The options for validating objects and certificate chains.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValidationOptions {
    /// Whether encoding rules should be enforced strictly.
    ///
    /// If this is `true`, signed objects must be DER encoded. Otherwise,
    /// BER encoding is accepted, too.
    pub strict: bool,

    /// The time at which certificates need to be valid.
    pub validation_time: Time,
}

impl ValidationOptions {
    /// Creates options for validating at the given time.
    pub fn at(validation_time: Time) -> Self {
        ValidationOptions { strict: false, validation_time }
    }

    /// Returns the options with strict mode set as given.
    pub fn with_strict(self, strict: bool) -> Self {
        ValidationOptions { strict, ..self }
    }

    /// Returns the decoding mode to use for signed objects.
    pub fn mode(self) -> Mode {
        if self.strict {
            Mode::Der
        }
        else {
            Mode::Ber
        }
    }
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions::at(Time::now())
    }
}
