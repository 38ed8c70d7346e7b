//! AS Resources for use with RPKI certificates.
//!
//! The types herein are defined in [RFC 3779] for use with certificates in
//! general. [RFC 6487] specifies how to use them with RPKI certificates.
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

use std::{error, fmt};
use std::str::FromStr;
use bcder::decode;
use bcder::Tag;
use bcder::decode::DecodeError;
use super::chain::{Block, Chain};
use super::choice::ResourcesChoice;


//------------ Asn -----------------------------------------------------------

/// An autonomous system number.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Asn(u32);

impl Asn {
    pub const MIN: Asn = Asn(u32::MIN);
    pub const MAX: Asn = Asn(u32::MAX);

    pub fn into_u32(self) -> u32 {
        self.0
    }

    /// Takes an AS number from the beginning of an encoded value.
    fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_u32().map(Asn)
    }

    /// Parses the content of an AS number value.
    fn parse_content<S: decode::Source>(
        content: &mut decode::Content<S>,
    ) -> Result<Self, DecodeError<S::Error>> {
        content.to_u32().map(Asn)
    }
}

impl From<u32> for Asn {
    fn from(value: u32) -> Self {
        Asn(value)
    }
}

impl FromStr for Asn {
    type Err = FromStrError;

    /// Parses an AS number with or without the `AS` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = if s.len() > 2 && s[..2].eq_ignore_ascii_case("as") {
            &s[2..]
        }
        else {
            s
        };
        u32::from_str(digits).map(Asn).map_err(|_| FromStrError::asn(s))
    }
}

impl fmt::Display for Asn {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "AS{}", self.0)
    }
}


//------------ AsBlock -------------------------------------------------------

/// A consecutive range of AS numbers.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct AsBlock {
    min: Asn,
    max: Asn,
}

impl AsBlock {
    /// Takes an optional AS block from the beginning of an encoded value.
    ///
    /// The `id` choice is mapped to a block covering a single number.
    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_value(|tag, content| {
            if tag == Tag::INTEGER {
                Asn::parse_content(content).map(|id| AsBlock::new(id, id))
            }
            else if tag == Tag::SEQUENCE {
                let cons = content.as_constructed()?;
                let min = Asn::take_from(cons)?;
                let max = Asn::take_from(cons)?;
                if min > max {
                    return Err(cons.content_err("invalid AS range"))
                }
                Ok(AsBlock::new(min, max))
            }
            else {
                Err(content.content_err("invalid AS resources"))
            }
        })
    }
}

impl Block for AsBlock {
    type Item = Asn;

    fn new(min: Asn, max: Asn) -> Self {
        AsBlock { min, max }
    }

    fn min(&self) -> Asn {
        self.min
    }

    fn max(&self) -> Asn {
        self.max
    }

    fn next(item: Asn) -> Option<Asn> {
        item.0.checked_add(1).map(Asn)
    }

    fn previous(item: Asn) -> Option<Asn> {
        item.0.checked_sub(1).map(Asn)
    }
}

impl From<Asn> for AsBlock {
    fn from(id: Asn) -> Self {
        AsBlock::new(id, id)
    }
}

impl FromStr for AsBlock {
    type Err = FromStrError;

    /// Parses either a single AS number or a range `AS1-AS2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((min, max)) => {
                let (min, max) = (Asn::from_str(min)?, Asn::from_str(max)?);
                if min > max {
                    return Err(FromStrError::asn(s))
                }
                Ok(AsBlock::new(min, max))
            }
            None => Asn::from_str(s).map(Into::into)
        }
    }
}

impl fmt::Display for AsBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        }
        else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}


//------------ AsBlocks ------------------------------------------------------

/// A normalized set of AS numbers.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct AsBlocks(Chain<AsBlock>);

impl AsBlocks {
    pub fn empty() -> Self {
        AsBlocks(Chain::empty())
    }

    /// Returns a set containing all AS numbers.
    pub fn all() -> Self {
        AsBlocks(std::iter::once(AsBlock::new(Asn::MIN, Asn::MAX)).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AsBlock> + '_ {
        self.0.iter()
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.0.contains(&other.0)
    }

    pub fn union(&self, other: &Self) -> Self {
        AsBlocks(self.0.union(&other.0))
    }

    pub fn intersection(&self, other: &Self) -> Self {
        AsBlocks(self.0.intersection(&other.0))
    }

    pub fn difference(&self, other: &Self) -> Self {
        AsBlocks(self.0.difference(&other.0))
    }
}

/// # Decoding
///
impl AsBlocks {
    /// Takes the AS resources extension content from an encoded value.
    ///
    /// The ASN.1 specification for the `ASIdentifiers` types parsed here is
    /// given in section 3.2.3 of [RFC 3779] as follows:
    ///
    /// ```text
    /// ASIdentifiers      ::= SEQUENCE {
    ///     asnum              [0] EXPLICIT AsIdentifierChoice OPTIONAL,
    ///     rdi                [1] EXPLICIT AsIdentifierChoice OPTIONAL }
    ///
    /// AsIdentifierChoice ::= CHOICE {
    ///     inherit            NULL,
    ///     asIdsOrRanges      SEQUENCE OF ASIdOrRange }
    ///
    /// ASIdOrRange        ::= CHOICE {
    ///     id                 ASId,
    ///     range              ASRange }
    ///
    /// ASRange            ::= SEQUENCE {
    ///     min                ASId,
    ///     max                ASId }
    ///
    /// ASId               ::= INTEGER
    /// ```
    ///
    /// Section 4.8.11 of [RFC 6487] limits the `ASIdentifiers` to the
    /// `asnum` choice. Routing domain identifiers are skipped here. A
    /// missing `asnum` results in [`ResourcesChoice::Missing`].
    ///
    /// [RFC 3779]: https://tools.ietf.org/html/rfc3779
    /// [RFC 6487]: https://tools.ietf.org/html/rfc6487
    pub fn take_choice_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<ResourcesChoice<Self>, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let res = cons.take_opt_constructed_if(Tag::CTX_0, |cons| {
                cons.take_value(|tag, content| {
                    if tag == Tag::NULL {
                        content.to_null()?;
                        Ok(ResourcesChoice::Inherit)
                    }
                    else if tag == Tag::SEQUENCE {
                        Self::parse_cons_content(content.as_constructed()?)
                            .map(ResourcesChoice::Blocks)
                    }
                    else {
                        Err(content.content_err("invalid AS resources"))
                    }
                })
            })?;
            cons.take_opt_constructed_if(Tag::CTX_1, |cons| cons.skip_all())?;
            Ok(res.unwrap_or(ResourcesChoice::Missing))
        })
    }

    fn parse_cons_content<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let mut blocks = Vec::new();
        while let Some(block) = AsBlock::take_opt_from(cons)? {
            blocks.push(block);
        }
        Ok(AsBlocks(blocks.into_iter().collect()))
    }
}


//--- FromStr and FromIterator

impl FromStr for AsBlocks {
    type Err = FromStrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(
            AsBlock::from_str
        ).collect()
    }
}

impl FromIterator<AsBlock> for AsBlocks {
    fn from_iter<I: IntoIterator<Item = AsBlock>>(iter: I) -> Self {
        AsBlocks(iter.into_iter().collect())
    }
}


//--- Display

impl fmt::Display for AsBlocks {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, block) in self.0.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            block.fmt(f)?;
        }
        Ok(())
    }
}


//------------ FromStrError --------------------------------------------------

/// A string could not be parsed into resources.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FromStrError(String);

impl FromStrError {
    pub(super) fn asn(s: &str) -> Self {
        FromStrError(format!("invalid AS resource '{}'", s))
    }

    pub(super) fn ip(s: &str) -> Self {
        FromStrError(format!("invalid IP resource '{}'", s))
    }
}

impl fmt::Display for FromStrError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl error::Error for FromStrError { }


//============ Tests =========================================================
