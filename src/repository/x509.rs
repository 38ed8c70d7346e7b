//! Types common to all things X.509.

use std::{error, fmt, ops, str};
use std::convert::Infallible;
use bcder::decode;
use bcder::{BitString, Captured, Mode, OctetString, Oid, Tag, Unsigned};
use bcder::decode::{DecodeError, ContentError, IntoSource, Source};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use crate::oid;
use crate::crypto::{
    PublicKey, RpkiSignatureAlgorithm, Signature, SignatureVerificationError,
};
use crate::util::hex;
use super::error::VerificationError;


//------------ Functions -----------------------------------------------------

/// Updates an optional value the first time.
///
/// Always runs `op` but only assigns its result to `opt` if that doesn’t hold
/// a value yet.
pub fn update_first<F, T, E>(opt: &mut Option<T>, op: F) -> Result<(), E>
where F: FnOnce() -> Result<Option<T>, E> {
    if let Some(value) = op()? {
        if opt.is_none() {
            *opt = Some(value);
        }
    }
    Ok(())
}

/// Skips over the content of a value of any kind.
pub fn skip_content<S: decode::Source>(
    content: &mut decode::Content<S>
) -> Result<(), DecodeError<S::Error>> {
    match *content {
        decode::Content::Primitive(ref mut inner) => inner.skip_all(),
        decode::Content::Constructed(ref mut inner) => inner.skip_all(),
    }
}


//------------ AlgorithmIdentifier -------------------------------------------

/// A generic algorithm identifier.
///
/// ```txt
/// AlgorithmIdentifier ::= SEQUENCE {
///      algorithm          OBJECT IDENTIFIER,
///      parameters         ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// This type accepts any algorithm. It is used where an unexpected algorithm
/// needs to be reported rather than refused while decoding. Of the
/// parameters, only whether they are absent, `NULL`, or something else is
/// kept.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AlgorithmIdentifier {
    algorithm: Oid<Bytes>,
    params: AlgorithmParams,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AlgorithmParams {
    Absent,
    Null,
    Other,
}

impl AlgorithmIdentifier {
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let algorithm = Oid::take_from(cons)?;
            let params = if cons.take_opt_primitive_if(
                Tag::NULL, |_| Ok(())
            )?.is_some() {
                AlgorithmParams::Null
            }
            else if cons.skip_one()?.is_some() {
                cons.skip_all()?;
                AlgorithmParams::Other
            }
            else {
                AlgorithmParams::Absent
            };
            Ok(AlgorithmIdentifier { algorithm, params })
        })
    }

    /// Returns the object identifier of the algorithm.
    pub fn algorithm(&self) -> &Oid<Bytes> {
        &self.algorithm
    }

    /// Returns whether there is a parameters field.
    pub fn has_params(&self) -> bool {
        !matches!(self.params, AlgorithmParams::Absent)
    }

    /// Returns whether the parameters are absent or `NULL`.
    pub fn has_null_or_no_params(&self) -> bool {
        !matches!(self.params, AlgorithmParams::Other)
    }
}


//------------ Name ----------------------------------------------------------

/// A distinguished name.
///
/// The name is kept in its encoded form. Two names are equal if their
/// encodings are identical.
#[derive(Clone, Debug)]
pub struct Name(Captured);

impl Name {
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.capture(|cons| {
            cons.take_sequence(|cons| { // RDNSequence
                while let Some(()) = cons.take_opt_set(|cons| {
                    let mut empty_set = true;
                    while let Some(()) = cons.take_opt_sequence(|cons| {
                        empty_set = false;
                        Oid::skip_in(cons)?;
                        if cons.skip_one()?.is_none() {
                            return Err(cons.content_err(
                                "name attribute without value"
                            ))
                        }
                        Ok(())
                    })? { }
                    if empty_set {
                        return Err(cons.content_err(
                            "empty relative distinguished name"
                        ));
                    }
                    Ok(())
                })? { }
                Ok(())
            })
        }).map(Name)
    }

    /// Returns the raw encoded name.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Returns the value of the first common name attribute.
    pub fn common_name(&self) -> Option<String> {
        self.attributes().ok()?.into_iter().find_map(|(id, value)| {
            if id == oid::AT_COMMON_NAME {
                Some(String::from_utf8_lossy(value.as_ref()).into_owned())
            }
            else {
                None
            }
        })
    }

    /// Returns all attributes in the order they appear in.
    fn attributes(
        &self
    ) -> Result<Vec<(Oid<Bytes>, Bytes)>, DecodeError<Infallible>> {
        self.0.clone().decode(|cons| {
            let mut res = Vec::new();
            cons.take_sequence(|cons| {
                while let Some(()) = cons.take_opt_set(|cons| {
                    while let Some(()) = cons.take_opt_sequence(|cons| {
                        let id = Oid::take_from(cons)?;
                        let value = cons.take_value(|_, content| {
                            OctetString::from_content(content)
                        })?;
                        res.push((id, value.to_bytes()));
                        Ok(())
                    })? { }
                    Ok(())
                })? { }
                Ok(())
            })?;
            Ok(res)
        })
    }
}


//--- PartialEq and Eq

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.0.as_slice() == other.0.as_slice()
    }
}

impl Eq for Name {}


//--- Display

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let attrs = match self.attributes() {
            Ok(attrs) => attrs,
            Err(_) => return f.write_str("<invalid name>")
        };
        for (idx, (id, value)) in attrs.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            if *id == oid::AT_COMMON_NAME {
                f.write_str("CN=")?
            }
            else if *id == oid::AT_SERIAL_NUMBER {
                f.write_str("SERIALNUMBER=")?
            }
            else if *id == oid::AT_COUNTRY_NAME {
                f.write_str("C=")?
            }
            else if *id == oid::AT_ORGANIZATION_NAME {
                f.write_str("O=")?
            }
            else if *id == oid::AT_ORGANIZATIONAL_UNIT_NAME {
                f.write_str("OU=")?
            }
            else {
                write!(f, "{}=", id)?
            }
            match str::from_utf8(value.as_ref()) {
                Ok(value) => f.write_str(value)?,
                Err(_) => write!(f, "#{}", hex::display(value.as_ref()))?,
            }
        }
        Ok(())
    }
}


//------------ Serial --------------------------------------------------------

/// A certificate serial number.
//
//  We encode the serial number in 20 octets left padded.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Serial([u8; 20]);

impl Serial {
    /// Creates a serial number from an octet slice.
    ///
    /// Leading zero octets are ignored. The remaining value must not be
    /// longer than 20 octets.
    pub fn from_slice(s: &[u8]) -> Result<Self, SerialSliceError> {
        if s.is_empty() {
            return Err(SerialSliceError::empty())
        }
        let start = s.iter().position(|&ch| ch != 0).unwrap_or(s.len());
        let s = &s[start..];
        if s.len() > 20 {
            return Err(SerialSliceError::long())
        }
        let mut res = <[u8; 20]>::default();
        res[20 - s.len()..].copy_from_slice(s);
        Ok(Self(res))
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Unsigned::take_from(cons).and_then(|s| {
            Self::from_slice(s.as_ref()).map_err(|err| cons.content_err(err))
        })
    }

    /// Divides by `rhs` in place and returns the remainder.
    fn div_assign_u8(&mut self, rhs: u8) -> u8 {
        let mut step: u16 = 0;
        let rhs = u16::from(rhs);
        for octet in self.0.iter_mut() {
            step = (step << 8) + u16::from(*octet);
            *octet = (step / rhs) as u8;
            step %= rhs;
        }
        step as u8
    }

    fn is_zero(self) -> bool {
        self.0.iter().all(|&ch| ch == 0)
    }

    /// Returns the decimal representation of the serial number.
    fn to_decimal(self) -> String {
        let mut value = self;
        let mut digits = Vec::new();
        while !value.is_zero() {
            digits.push(char::from(value.div_assign_u8(10) + b'0'));
        }
        if digits.is_empty() {
            digits.push('0');
        }
        digits.into_iter().rev().collect()
    }
}


//--- From

impl From<u64> for Serial {
    fn from(value: u64) -> Self {
        let mut res = <[u8; 20]>::default();
        res[12..].copy_from_slice(&value.to_be_bytes());
        Serial(res)
    }
}


//--- Display and Debug

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

impl fmt::Debug for Serial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Serial({self})")
    }
}


//--- Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Serial {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        self.to_decimal().serialize(serializer)
    }
}


//------------ SignedData ----------------------------------------------------

/// Data signed with the RPKI signature algorithm.
///
/// ```txt
/// SignedData ::= SEQUENCE {
///     data                  ANY,
///     signatureAlgorithm    AlgorithmIdentifier,
///     signatureValue        BIT STRING }
/// ```
///
/// This is the outer structure of certificates and CRLs.
#[derive(Clone, Debug)]
pub struct SignedData {
    data: Captured,
    signature: Signature,
}

impl SignedData {
    pub fn data(&self) -> &Captured {
        &self.data
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn decode<S: IntoSource>(
        source: S
    ) -> Result<Self, DecodeError<<S::Source as Source>::Error>> {
        Mode::Der.decode(source, Self::take_from)
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(Self::from_constructed)
    }

    pub fn from_constructed<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        Ok(SignedData {
            data: cons.capture_one()?,
            signature: Signature::new(
                RpkiSignatureAlgorithm::x509_take_from(cons)?,
                BitString::take_from(cons)?.octet_bytes()
            )
        })
    }

    /// Verifies that the data was signed by the given key.
    pub fn verify_signature(
        &self,
        public_key: &PublicKey
    ) -> Result<(), SignatureVerificationError> {
        public_key.verify(
            self.data.as_slice(), self.signature.value().as_ref()
        )
    }
}


//--- PartialEq and Eq

impl PartialEq for SignedData {
    fn eq(&self, other: &Self) -> bool {
        self.data.as_slice() == other.data.as_slice() &&
            self.signature == other.signature
    }
}

impl Eq for SignedData {}


//------------ Time ----------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(DateTime<Utc>);

impl Time {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Time(dt)
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Creates a time value from its components.
    ///
    /// # Panics
    ///
    /// The function panics if the components do not form a valid time.
    pub fn utc(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Self {
        match Utc.with_ymd_and_hms(year, month, day, hour, min, sec).single() {
            Some(dt) => Time(dt),
            None => panic!("invalid time components")
        }
    }

    /// Takes a time value encoded as either UTCTime or GeneralizedTime.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive(|tag, prim| {
            match tag {
                Tag::UTC_TIME => Self::from_utc_time(prim),
                Tag::GENERALIZED_TIME => Self::from_generalized_time(prim),
                _ => {
                    Err(prim.content_err(
                        "malformed time value"
                    ))
                }
            }
        })
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        let res = cons.take_opt_primitive_if(
            Tag::UTC_TIME, Self::from_utc_time
        )?;
        if let Some(res) = res {
            return Ok(Some(res))
        }
        cons.take_opt_primitive_if(
            Tag::GENERALIZED_TIME, Self::from_generalized_time
        )
    }

    /// Parses the content of a UTCTime.
    ///
    /// RFC 5280 requires the format YYMMDDHHMMSSZ. Two digit years of 50
    /// and up are in the twentieth century.
    fn from_utc_time<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let year = read_digits(prim, 2)? as i32;
        let year = if year >= 50 { year + 1900 } else { year + 2000 };
        Self::from_remaining_parts(year, prim)
    }

    /// Parses the content of a GeneralizedTime.
    ///
    /// RFC 5280 requires the format YYYYMMDDHHMMSSZ.
    fn from_generalized_time<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let year = read_digits(prim, 4)? as i32;
        Self::from_remaining_parts(year, prim)
    }

    fn from_remaining_parts<S: decode::Source>(
        year: i32,
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let month = read_digits(prim, 2)?;
        let day = read_digits(prim, 2)?;
        let hour = read_digits(prim, 2)?;
        let min = read_digits(prim, 2)?;
        let sec = read_digits(prim, 2)?;
        if prim.take_u8()? != b'Z' {
            return Err(prim.content_err("malformed time value"))
        }
        match Utc.with_ymd_and_hms(year, month, day, hour, min, sec) {
            chrono::LocalResult::Single(dt) => Ok(Time(dt)),
            _ => Err(prim.content_err("malformed time value"))
        }
    }

    pub fn verify_not_before(
        &self,
        now: Time
    ) -> Result<(), ValidityPeriodError> {
        if now.0 < self.0 {
            Err(ValidityPeriodError::too_new())
        }
        else {
            Ok(())
        }
    }

    pub fn verify_not_after(
        &self,
        now: Time
    ) -> Result<(), ValidityPeriodError> {
        if now.0 > self.0 {
            Err(ValidityPeriodError::too_old())
        }
        else {
            Ok(())
        }
    }
}


//--- Deref

impl ops::Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}


//--- From

impl From<DateTime<Utc>> for Time {
    fn from(time: DateTime<Utc>) -> Self {
        Time(time)
    }
}

impl From<Time> for DateTime<Utc> {
    fn from(time: Time) -> Self {
        time.0
    }
}


//--- Display

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}


/// Reads `len` ASCII digits and returns their value.
fn read_digits<S: decode::Source>(
    prim: &mut decode::Primitive<S>,
    len: usize,
) -> Result<u32, DecodeError<S::Error>> {
    let mut res = 0;
    for _ in 0..len {
        let ch = prim.take_u8()?;
        if !ch.is_ascii_digit() {
            return Err(prim.content_err("malformed time value"))
        }
        res = res * 10 + u32::from(ch - b'0');
    }
    Ok(res)
}


//------------ Validity ------------------------------------------------------

#[derive(Clone, Debug, Copy, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Validity {
    not_before: Time,
    not_after: Time,
}

impl Validity {
    pub fn new(not_before: Time, not_after: Time) -> Self {
        Validity { not_before, not_after }
    }

    pub fn not_before(self) -> Time {
        self.not_before
    }

    pub fn not_after(self) -> Time {
        self.not_after
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            Ok(Validity::new(
                Time::take_from(cons)?,
                Time::take_from(cons)?,
            ))
        })
    }

    pub fn verify_at(self, now: Time) -> Result<(), ValidityPeriodError> {
        self.not_before.verify_not_before(now)?;
        self.not_after.verify_not_after(now)?;
        Ok(())
    }
}


//============ Error Types ===================================================

//------------ SerialSliceError ----------------------------------------------

/// A serial number’s slice is empty or too long.
#[derive(Clone, Copy, Debug)]
pub struct SerialSliceError(SerialSliceErrorKind);

#[derive(Clone, Copy, Debug)]
enum SerialSliceErrorKind {
    Empty,
    Long,
}

impl SerialSliceError {
    fn empty() -> Self {
        SerialSliceError(SerialSliceErrorKind::Empty)
    }

    fn long() -> Self {
        SerialSliceError(SerialSliceErrorKind::Long)
    }

    fn as_str(self) -> &'static str {
        match self.0 {
            SerialSliceErrorKind::Empty => "empty serial number",
            SerialSliceErrorKind::Long => "serial number longer than 20 bytes"
        }
    }
}

impl From<SerialSliceError> for ContentError {
    fn from(err: SerialSliceError) -> Self {
        ContentError::from_static(err.as_str())
    }
}

impl fmt::Display for SerialSliceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl error::Error for SerialSliceError { }


//------------ ValidityPeriodError -------------------------------------------

/// An object is outside of its period of validity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ValidityPeriodError {
    /// Is the object too new?
    ///
    /// It is too old otherwise.
    too_new: bool,
}

impl ValidityPeriodError {
    fn too_new() -> Self {
        ValidityPeriodError { too_new: true }
    }

    fn too_old() -> Self {
        ValidityPeriodError { too_new: false }
    }

    /// Returns whether the object is not yet valid.
    pub fn is_too_new(self) -> bool {
        self.too_new
    }
}

impl From<ValidityPeriodError> for VerificationError {
    fn from(err: ValidityPeriodError) -> Self {
        VerificationError::new(
            if err.too_new {
                "certificate is not yet valid"
            }
            else {
                "certificate has expired"
            }
        )
    }
}

impl fmt::Display for ValidityPeriodError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(
            if self.too_new {
                "object is not yet valid"
            }
            else {
                "object has expired"
            }
        )
    }
}

impl error::Error for ValidityPeriodError { }


//============ Tests =========================================================
