//! IP Resources for use with RPKI certificates.
//!
//! The types herein are defined in [RFC 3779] for use with certificates in
//! general. [RFC 6487] specifies how to use them with RPKI certificates. In
//! particular, it prohibits the use of Subsequent AFI values for address
//! families. Since certificates are decoded leniently, such values are
//! accepted and ignored here.
//!
//! Addresses of both families are kept as `u128` values. IPv4 addresses
//! occupy the lower 32 bits. Because of that, a block doesn’t know its
//! family, and some operations need to be told.
//!
//! [RFC 3779]: https://tools.ietf.org/html/rfc3779
//! [RFC 6487]: https://tools.ietf.org/html/rfc6487

use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use bcder::decode;
use bcder::{BitString, OctetString, Tag};
use bcder::decode::DecodeError;
use super::asres::FromStrError;
use super::chain::{Block, Chain};
use super::choice::ResourcesChoice;


//------------ AddressFamily -------------------------------------------------

/// The two address families supported by RPKI.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Returns the number of bits in an address of the family.
    pub fn bits(self) -> u32 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }

    /// Returns the largest address of the family.
    pub fn max_addr(self) -> u128 {
        host_mask(self, 0)
    }

    /// Takes a single address family from an encoded value.
    ///
    /// ```text
    /// addressFamily        OCTET STRING (SIZE (2..3))
    /// ```
    ///
    /// The first two octets are the AFI. The optional third octet is a
    /// SAFI which we ignore.
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let str = OctetString::take_from(cons)?;
        let octets = str.to_bytes();
        match octets.as_ref() {
            [0, 1] | [0, 1, _] => Ok(AddressFamily::Ipv4),
            [0, 2] | [0, 2, _] => Ok(AddressFamily::Ipv6),
            _ => Err(cons.content_err("invalid address family"))
        }
    }

    fn parse_addr(self, s: &str) -> Result<u128, FromStrError> {
        match self {
            AddressFamily::Ipv4 => {
                Ipv4Addr::from_str(s).map(|addr| u128::from(u32::from(addr)))
            }
            AddressFamily::Ipv6 => {
                Ipv6Addr::from_str(s).map(u128::from)
            }
        }.map_err(|_| FromStrError::ip(s))
    }

    fn fmt_addr(self, addr: u128, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => {
                write!(f, "{}", Ipv4Addr::from(addr as u32))
            }
            AddressFamily::Ipv6 => {
                write!(f, "{}", Ipv6Addr::from(addr))
            }
        }
    }
}

/// Returns the mask for the host portion of a prefix of length `len`.
fn host_mask(family: AddressFamily, len: u32) -> u128 {
    let host_bits = family.bits().saturating_sub(len);
    if host_bits == 0 {
        0
    }
    else {
        u128::MAX >> (128 - host_bits)
    }
}


//------------ IpBlock -------------------------------------------------------

/// A consecutive range of IP addresses.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct IpBlock {
    min: u128,
    max: u128,
}

impl IpBlock {
    /// Creates a block from a prefix.
    ///
    /// Returns `None` if the prefix length is too long for the family.
    pub fn from_prefix(
        family: AddressFamily, addr: u128, len: u32
    ) -> Option<Self> {
        if len > family.bits() {
            return None
        }
        let mask = host_mask(family, len);
        Some(IpBlock::new(addr & !mask, addr | mask))
    }

    /// Returns the prefix length if the block is exactly one prefix.
    pub fn prefix_len(&self, family: AddressFamily) -> Option<u32> {
        let diff = self.max - self.min;
        let is_power = diff.checked_add(1).map_or(
            true, u128::is_power_of_two
        );
        if is_power && self.min & diff == 0 {
            Some(family.bits() - diff.count_ones())
        }
        else {
            None
        }
    }

    /// Returns a displayable value for the block.
    pub fn display(&self, family: AddressFamily) -> impl fmt::Display + '_ {
        DisplayBlock { block: self, family }
    }

    /// Takes an optional block from the beginning of an encoded value.
    ///
    /// ```text
    /// IPAddressOrRange    ::= CHOICE {
    ///     addressPrefix       IPAddress,
    ///     addressRange        IPAddressRange }
    ///
    /// IPAddressRange      ::= SEQUENCE {
    ///     min                 IPAddress,
    ///     max                 IPAddress }
    ///
    /// IPAddress           ::= BIT STRING
    /// ```
    ///
    /// The bits of the minimum address are extended with zeros, those of
    /// the maximum with ones.
    fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        family: AddressFamily,
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_value(|tag, content| {
            if tag == Tag::BIT_STRING {
                let bits = BitString::from_content(content)?;
                let (addr, len) = bits_to_addr(&bits, family).ok_or_else(|| {
                    content.content_err("invalid address prefix")
                })?;
                let mask = host_mask(family, len);
                Ok(IpBlock::new(addr & !mask, addr | mask))
            }
            else if tag == Tag::SEQUENCE {
                let cons = content.as_constructed()?;
                let min = BitString::take_from(cons)?;
                let max = BitString::take_from(cons)?;
                match (
                    bits_to_addr(&min, family), bits_to_addr(&max, family)
                ) {
                    (Some((min, min_len)), Some((max, max_len))) => {
                        let min = min & !host_mask(family, min_len);
                        let max = max | host_mask(family, max_len);
                        if min > max {
                            return Err(cons.content_err(
                                "invalid address range"
                            ))
                        }
                        Ok(IpBlock::new(min, max))
                    }
                    _ => Err(cons.content_err("invalid address range"))
                }
            }
            else {
                Err(content.content_err("invalid IP resources"))
            }
        })
    }

    fn from_str_family(
        s: &str, family: AddressFamily
    ) -> Result<Self, FromStrError> {
        if let Some((addr, len)) = s.split_once('/') {
            let addr = family.parse_addr(addr.trim())?;
            let len = u32::from_str(len.trim()).map_err(|_| {
                FromStrError::ip(s)
            })?;
            let block = IpBlock::from_prefix(family, addr, len).ok_or_else(
                || FromStrError::ip(s)
            )?;
            // Host bits must not be set.
            if block.min != addr {
                return Err(FromStrError::ip(s))
            }
            Ok(block)
        }
        else if let Some((min, max)) = s.split_once('-') {
            let min = family.parse_addr(min.trim())?;
            let max = family.parse_addr(max.trim())?;
            if min > max {
                return Err(FromStrError::ip(s))
            }
            Ok(IpBlock::new(min, max))
        }
        else {
            let addr = family.parse_addr(s)?;
            Ok(IpBlock::new(addr, addr))
        }
    }
}

/// Converts the bits of an RFC 3779 `IPAddress` into an address.
///
/// Returns the address with all bits beyond the bit string cleared and the
/// number of bits, or `None` if the bit string is too long.
fn bits_to_addr(
    bits: &BitString, family: AddressFamily
) -> Option<(u128, u32)> {
    let width = family.bits();
    let octets = bits.octet_bytes();
    if octets.len() * 8 > width as usize {
        return None
    }
    let mut addr = 0u128;
    for (idx, &octet) in octets.iter().enumerate() {
        addr |= u128::from(octet) << (width - 8 * (idx as u32 + 1));
    }
    let len = ((octets.len() * 8) as u32).checked_sub(
        u32::from(bits.unused())
    )?;
    Some((addr & !host_mask(family, len), len))
}

impl Block for IpBlock {
    type Item = u128;

    fn new(min: u128, max: u128) -> Self {
        IpBlock { min, max }
    }

    fn min(&self) -> u128 {
        self.min
    }

    fn max(&self) -> u128 {
        self.max
    }

    fn next(item: u128) -> Option<u128> {
        item.checked_add(1)
    }

    fn previous(item: u128) -> Option<u128> {
        item.checked_sub(1)
    }
}


//------------ DisplayBlock --------------------------------------------------

struct DisplayBlock<'a> {
    block: &'a IpBlock,
    family: AddressFamily,
}

impl fmt::Display for DisplayBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.block.prefix_len(self.family) {
            Some(len) => {
                self.family.fmt_addr(self.block.min, f)?;
                write!(f, "/{}", len)
            }
            None => {
                self.family.fmt_addr(self.block.min, f)?;
                f.write_str("-")?;
                self.family.fmt_addr(self.block.max, f)
            }
        }
    }
}


//------------ IpBlocks ------------------------------------------------------

/// A normalized set of IP addresses of one family.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct IpBlocks(Chain<IpBlock>);

impl IpBlocks {
    pub fn empty() -> Self {
        IpBlocks(Chain::empty())
    }

    /// Returns a set with all addresses of the given family.
    pub fn all(family: AddressFamily) -> Self {
        IpBlocks(
            std::iter::once(IpBlock::new(0, family.max_addr())).collect()
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IpBlock> + '_ {
        self.0.iter()
    }

    pub fn contains(&self, other: &Self) -> bool {
        self.0.contains(&other.0)
    }

    pub fn union(&self, other: &Self) -> Self {
        IpBlocks(self.0.union(&other.0))
    }

    pub fn intersection(&self, other: &Self) -> Self {
        IpBlocks(self.0.intersection(&other.0))
    }

    pub fn difference(&self, other: &Self) -> Self {
        IpBlocks(self.0.difference(&other.0))
    }

    /// Returns a displayable value for the blocks.
    ///
    /// Blocks are separated by a comma and a space.
    pub fn display(&self, family: AddressFamily) -> impl fmt::Display + '_ {
        DisplayBlocks { blocks: self, family }
    }

    /// Parses a comma separated list of prefixes, ranges, or addresses.
    pub fn from_str_family(
        s: &str, family: AddressFamily
    ) -> Result<Self, FromStrError> {
        s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(|s| {
            IpBlock::from_str_family(s, family)
        }).collect()
    }

    pub(super) fn push_str(
        &mut self, s: &str, family: AddressFamily
    ) -> Result<(), FromStrError> {
        let block = IpBlock::from_str_family(s, family)?;
        *self = self.iter().cloned().chain(Some(block)).collect();
        Ok(())
    }
}

/// # Decoding
///
impl IpBlocks {
    /// Takes the IP resources extension content from an encoded value.
    ///
    /// ```text
    /// IPAddrBlocks        ::= SEQUENCE OF IPAddressFamily
    ///
    /// IPAddressFamily     ::= SEQUENCE {    -- AFI & optional SAFI --
    ///     addressFamily        OCTET STRING (SIZE (2..3)),
    ///     ipAddressChoice      IPAddressChoice }
    ///
    /// IPAddressChoice     ::= CHOICE {
    ///     inherit              NULL, -- inherit from issuer --
    ///     addressesOrRanges    SEQUENCE OF IPAddressOrRange }
    /// ```
    ///
    /// Returns the choices for IPv4 and IPv6 in that order. A family
    /// appearing more than once is an error.
    pub fn take_choices_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<
        (ResourcesChoice<Self>, ResourcesChoice<Self>),
        DecodeError<S::Error>
    > {
        cons.take_sequence(|cons| {
            let mut v4 = ResourcesChoice::Missing;
            let mut v6 = ResourcesChoice::Missing;
            while let Some(()) = cons.take_opt_sequence(|cons| {
                let family = AddressFamily::take_from(cons)?;
                let target = match family {
                    AddressFamily::Ipv4 => &mut v4,
                    AddressFamily::Ipv6 => &mut v6,
                };
                if target.is_present() {
                    return Err(cons.content_err("duplicate address family"))
                }
                *target = Self::take_choice_from(cons, family)?;
                Ok(())
            })? { }
            Ok((v4, v6))
        })
    }

    fn take_choice_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>,
        family: AddressFamily,
    ) -> Result<ResourcesChoice<Self>, DecodeError<S::Error>> {
        cons.take_value(|tag, content| {
            if tag == Tag::NULL {
                content.to_null()?;
                Ok(ResourcesChoice::Inherit)
            }
            else if tag == Tag::SEQUENCE {
                let cons = content.as_constructed()?;
                let mut blocks = Vec::new();
                while let Some(block) = IpBlock::take_opt_from(cons, family)? {
                    blocks.push(block);
                }
                Ok(ResourcesChoice::Blocks(IpBlocks(
                    blocks.into_iter().collect()
                )))
            }
            else {
                Err(content.content_err("invalid IP resources"))
            }
        })
    }
}


//--- FromIterator

impl FromIterator<IpBlock> for IpBlocks {
    fn from_iter<I: IntoIterator<Item = IpBlock>>(iter: I) -> Self {
        IpBlocks(iter.into_iter().collect())
    }
}


//------------ DisplayBlocks -------------------------------------------------

struct DisplayBlocks<'a> {
    blocks: &'a IpBlocks,
    family: AddressFamily,
}

impl fmt::Display for DisplayBlocks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, block) in self.blocks.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", block.display(self.family))?;
        }
        Ok(())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::Mode;

    fn v4(s: &str) -> IpBlocks {
        IpBlocks::from_str_family(s, AddressFamily::Ipv4).unwrap()
    }

    fn v6(s: &str) -> IpBlocks {
        IpBlocks::from_str_family(s, AddressFamily::Ipv6).unwrap()
    }

    #[test]
    fn display_prefixes_and_ranges() {
        assert_eq!(
            v4("10.0.0.0/8, 192.168.0.0-192.168.2.255").display(
                AddressFamily::Ipv4
            ).to_string(),
            "10.0.0.0/8, 192.168.0.0-192.168.2.255"
        );
        assert_eq!(
            v4("10.0.0.0-10.255.255.255").display(
                AddressFamily::Ipv4
            ).to_string(),
            "10.0.0.0/8"
        );
        assert_eq!(
            v4("0.0.0.0/0").display(AddressFamily::Ipv4).to_string(),
            "0.0.0.0/0"
        );
        assert_eq!(
            v6("::/0").display(AddressFamily::Ipv6).to_string(),
            "::/0"
        );
        assert_eq!(
            v6("2001:db8::/32").display(AddressFamily::Ipv6).to_string(),
            "2001:db8::/32"
        );
        assert_eq!(
            v4("10.0.0.1").display(AddressFamily::Ipv4).to_string(),
            "10.0.0.1/32"
        );
    }

    #[test]
    fn from_str_rejects_garbage() {
        let family = AddressFamily::Ipv4;
        assert!(IpBlocks::from_str_family("10.0.0.1/8", family).is_err());
        assert!(IpBlocks::from_str_family("10.0.0.0/33", family).is_err());
        assert!(IpBlocks::from_str_family("2001:db8::/32", family).is_err());
        assert!(
            IpBlocks::from_str_family("10.0.0.2-10.0.0.1", family).is_err()
        );
    }

    #[test]
    fn difference_is_not_a_prefix() {
        let diff = v4("10.0.0.0/8").difference(&v4("10.0.0.0/9"));
        assert_eq!(
            diff.display(AddressFamily::Ipv4).to_string(), "10.128.0.0/9"
        );
        let diff = v4("10.0.0.0/8").difference(&v4("10.64.0.0/10"));
        assert_eq!(
            diff.display(AddressFamily::Ipv4).to_string(),
            "10.0.0.0/10, 10.128.0.0/9"
        );
    }

    #[test]
    fn take_choices_from() {
        // SEQUENCE {
        //   SEQUENCE { OCTET STRING 0001, SEQUENCE { BIT STRING 10/8 } }
        //   SEQUENCE { OCTET STRING 0002, NULL }
        // }
        let (ipv4, ipv6) = Mode::Der.decode(
            b"\x30\x14\
              \x30\x0a\x04\x02\x00\x01\x30\x04\x03\x02\x00\x0a\
              \x30\x06\x04\x02\x00\x02\x05\x00".as_ref(),
            IpBlocks::take_choices_from
        ).unwrap();
        assert_eq!(ipv4, ResourcesChoice::Blocks(v4("10.0.0.0/8")));
        assert!(ipv6.is_inherited());
    }

    #[test]
    fn take_range() {
        // SEQUENCE { SEQUENCE { 0001, SEQUENCE {
        //     SEQUENCE { BIT STRING 10.0.0.0/16, BIT STRING 10.2/15 }
        // } } }
        let (ipv4, ipv6) = Mode::Der.decode(
            b"\x30\x14\x30\x12\x04\x02\x00\x01\x30\x0c\
              \x30\x0a\x03\x03\x00\x0a\x00\x03\x03\x01\x0a\x02".as_ref(),
            IpBlocks::take_choices_from
        ).unwrap();
        assert_eq!(
            ipv4,
            ResourcesChoice::Blocks(v4("10.0.0.0-10.3.255.255"))
        );
        assert!(!ipv6.is_present());
    }
}
