//! Types common to all things X.509.

use std::{error, fmt, io, ops};
use std::str::FromStr;
use bcder::{decode, encode};
use bcder::{
    BitString, Captured, ConstOid, Mode, OctetString, Oid, PrintableString,
    Tag,
};
use bcder::decode::{ContentError, DecodeError, IntoSource, Source};
use bcder::encode::PrimitiveContent;
use bcder::Unsigned;
use chrono::{
    Datelike, DateTime, LocalResult, TimeDelta, Timelike, TimeZone, Utc
};
use crate::oid;
use crate::crypto::{
    PublicKey, RpkiSignatureAlgorithm, Signature, SignatureAlgorithm,
    SignatureVerificationError,
};
use crate::util::hex;


//------------ Functions -----------------------------------------------------

/// Assigns the result of `op` to `opt` unless it already holds a value.
///
/// Extensions must appear only once. If `opt` has already been set, a
/// content error is returned.
pub fn update_once<F, T, S>(
    opt: &mut Option<T>,
    cons: &mut decode::Constructed<S>,
    op: F
) -> Result<(), DecodeError<S::Error>>
where
    S: decode::Source,
    F: FnOnce(&mut decode::Constructed<S>) -> Result<T, DecodeError<S::Error>>
{
    if opt.is_some() {
        return Err(cons.content_err("duplicate extension"))
    }
    *opt = Some(op(cons)?);
    Ok(())
}

/// Returns an encoder for a single certificate or CRL extension.
pub fn encode_extension<V: encode::Values>(
    oid: &'static ConstOid,
    critical: bool,
    content: V
) -> impl encode::Values {
    encode::sequence((
        oid.encode(),
        if critical {
            Some(critical.encode())
        }
        else {
            None
        },
        OctetString::encode_wrapped(Mode::Der, content)
    ))
}


//------------ Name ----------------------------------------------------------

/// An X.500 distinguished name.
///
/// RPKI doesn’t care much about names. They are only compared for equality
/// between the issuer of a certificate and the subject of its issuer, so we
/// keep the encoded value and compare that.
#[derive(Clone)]
pub struct Name(Captured);

impl Name {
    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.capture(|cons| {
            cons.take_sequence(|cons| { // RDNSequence
                let mut empty = true;
                while let Some(()) = cons.take_opt_set(|cons| {
                    empty = false;
                    let mut attrs = 0;
                    while let Some(()) = cons.take_opt_sequence(|cons| {
                        attrs += 1;
                        Oid::skip_in(cons)?;
                        if cons.skip_one()?.is_none() {
                            return Err(cons.content_err("invalid name"))
                        }
                        Ok(())
                    })? { }
                    if attrs == 0 {
                        return Err(cons.content_err(
                            "empty relative distinguished name"
                        ))
                    }
                    Ok(())
                })? { }
                if empty {
                    return Err(cons.content_err("empty distinguished name"))
                }
                Ok(())
            })
        }).map(Name)
    }

    /// Creates a name with a single common name attribute.
    ///
    /// The value is encoded as a PrintableString, so `cn` should stick to
    /// the characters allowed there.
    pub fn from_common_name(cn: &str) -> Self {
        Name(Captured::from_values(Mode::Der, encode::sequence(
            encode::set(
                encode::sequence((
                    oid::AT_COMMON_NAME.encode(),
                    OctetString::encode_slice_as(
                        cn.as_bytes(), Tag::PRINTABLE_STRING
                    ),
                ))
            )
        )))
    }

    /// Derives a name from a public key.
    ///
    /// Section 8 of [RFC 6487] suggests deriving subject names from the
    /// key. We use the hex representation of the key identifier as the
    /// common name which keeps names unique per key.
    ///
    /// [RFC 6487]: https://tools.ietf.org/html/rfc6487
    pub fn from_pub_key(key_info: &PublicKey) -> Self {
        Self::from_common_name(&key_info.key_identifier().to_string())
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        &self.0
    }

    /// Returns whether the name follows the RPKI profile.
    ///
    /// Section 4.4 of [RFC 6487] asks for exactly one common name which
    /// has to be a PrintableString and allows at most one serial number.
    ///
    /// [RFC 6487]: https://tools.ietf.org/html/rfc6487
    pub fn is_rpki_name(&self) -> bool {
        fn count_attrs<S: decode::Source>(
            cons: &mut decode::Constructed<S>
        ) -> Result<(usize, usize), DecodeError<S::Error>> {
            let mut cn = 0;
            let mut sn = 0;
            cons.take_sequence(|cons| {
                while let Some(()) = cons.take_opt_set(|cons| {
                    while let Some(()) = cons.take_opt_sequence(|cons| {
                        let id = Oid::take_from(cons)?;
                        if id == oid::AT_COMMON_NAME {
                            PrintableString::take_from(cons)?;
                            cn += 1;
                        }
                        else {
                            if id == oid::AT_SERIAL_NUMBER {
                                sn += 1;
                            }
                            cons.skip_one()?;
                        }
                        Ok(())
                    })? { }
                    Ok(())
                })? { }
                Ok(())
            })?;
            Ok((cn, sn))
        }

        matches!(
            self.0.clone().decode(count_attrs),
            Ok((1, sn)) if sn <= 1
        )
    }

    /// Collects the attributes for display.
    fn take_display_parts<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Vec<String>, DecodeError<S::Error>> {
        cons.take_sequence(|cons| {
            let mut res = Vec::new();
            while let Some(()) = cons.take_opt_set(|cons| {
                while let Some(()) = cons.take_opt_sequence(|cons| {
                    let id = Oid::take_from(cons)?;
                    let label = if id == oid::AT_COMMON_NAME {
                        String::from("CN")
                    }
                    else if id == oid::AT_SERIAL_NUMBER {
                        String::from("SERIALNUMBER")
                    }
                    else {
                        id.to_string()
                    };
                    let value = cons.take_value(|tag, content| {
                        let octets = OctetString::from_content(content)?;
                        let octets = octets.to_bytes();
                        if tag == Tag::PRINTABLE_STRING
                            || tag == Tag::UTF8_STRING
                            || tag == Tag::IA5_STRING
                        {
                            Ok(String::from_utf8_lossy(&octets).into_owned())
                        }
                        else {
                            Ok(format!("#{}", hex::encode(&octets)))
                        }
                    })?;
                    res.push(format!("{}={}", label, value));
                    Ok(())
                })? { }
                Ok(())
            })? { }
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


//--- Display and Debug

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0.clone().decode(Self::take_display_parts) {
            Ok(parts) => f.write_str(&parts.join(",")),
            Err(_) => hex::write(self.0.as_slice(), f)
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Name({})", self)
    }
}


//------------ Serial --------------------------------------------------------

/// A certificate serial number.
///
/// RFC 5280 limits serial numbers to positive integers of at most 20
/// octets.
//
//  We keep the serial number in 20 octets left padded.
#[derive(Clone, Copy, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Serial([u8; 20]);

impl Serial {
    /// Creates a serial number from the octets of an unsigned integer.
    pub fn from_slice(s: &[u8]) -> Result<Self, SerialSliceError> {
        if s.is_empty() {
            return Err(SerialSliceError::Empty)
        }
        // Strip leading zeros, so that an encoded positive integer with a
        // sign octet fits.
        let start = s.iter().position(|&ch| ch != 0).unwrap_or(s.len());
        let s = &s[start..];
        if s.len() > 20 || (s.len() == 20 && s[0] & 0x80 != 0) {
            return Err(SerialSliceError::Long)
        }
        let mut res = [0u8; 20];
        res[20 - s.len()..].copy_from_slice(s);
        Ok(Serial(res))
    }

    /// Converts the serial number into a bytes array.
    pub fn into_array(self) -> [u8; 20] {
        self.0
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        let value = Unsigned::take_from(cons)?;
        Self::from_slice(value.as_ref()).map_err(|err| {
            cons.content_err(err)
        })
    }

    /// Returns the index of the first octet to encode.
    fn start(self) -> usize {
        let start = self.0.iter().position(|&ch| ch != 0).unwrap_or(19);
        if self.0[start] & 0x80 != 0 {
            start - 1
        }
        else {
            start
        }
    }

    /// Divides the value by `rhs` in place and returns the remainder.
    fn div_rem(&mut self, rhs: u8) -> u8 {
        let rhs = u16::from(rhs);
        let mut rem = 0u16;
        for octet in self.0.iter_mut() {
            let step = (rem << 8) | u16::from(*octet);
            *octet = (step / rhs) as u8;
            rem = step % rhs;
        }
        rem as u8
    }

    /// Multiplies by `mul` and adds `add`, returning `None` on overflow.
    fn mul_add(mut self, mul: u8, add: u8) -> Option<Self> {
        let mut carry = u16::from(add);
        for octet in self.0.iter_mut().rev() {
            let step = u16::from(*octet) * u16::from(mul) + carry;
            *octet = step as u8;
            carry = step >> 8;
        }
        if carry == 0 && self.0[0] & 0x80 == 0 {
            Some(self)
        }
        else {
            None
        }
    }
}


//--- From and FromStr

impl From<u64> for Serial {
    fn from(value: u64) -> Self {
        let mut res = [0u8; 20];
        res[12..].copy_from_slice(&value.to_be_bytes());
        Serial(res)
    }
}

impl FromStr for Serial {
    type Err = RepresentationError;

    /// Parses a serial number from its decimal representation.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.is_empty() {
            return Err(RepresentationError)
        }
        value.bytes().try_fold(Serial::default(), |res, ch| {
            if !ch.is_ascii_digit() {
                return Err(RepresentationError)
            }
            res.mul_add(10, ch - b'0').ok_or(RepresentationError)
        })
    }
}


//--- Display and Debug

impl fmt::Display for Serial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut value = *self;
        let mut digits = Vec::new();
        loop {
            digits.push(b'0' + value.div_rem(10));
            if value == Serial::default() {
                break
            }
        }
        for ch in digits.iter().rev() {
            write!(f, "{}", char::from(*ch))?;
        }
        Ok(())
    }
}

impl fmt::Debug for Serial {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Serial({})", self)
    }
}


//--- PrimitiveContent

impl PrimitiveContent for Serial {
    const TAG: Tag = Tag::INTEGER;

    fn encoded_len(&self, _mode: Mode) -> usize {
        20 - self.start()
    }

    fn write_encoded<W: io::Write>(
        &self,
        _mode: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(&self.0[self.start()..])
    }
}


//--- Deserialize and Serialize

#[cfg(feature = "serde")]
impl serde::Serialize for Serial {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Serial {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D
    ) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Serial::from_str(&s).map_err(serde::de::Error::custom)
    }
}


//------------ SignedData ----------------------------------------------------

/// Data signed in the way of X.509 certificates and CRLs.
///
/// ```txt
/// SignedData ::= SEQUENCE {
///     data                ANY,
///     signatureAlgorithm  AlgorithmIdentifier,
///     signatureValue      BIT STRING }
/// ```
#[derive(Clone, Debug)]
pub struct SignedData<Alg = RpkiSignatureAlgorithm> {
    data: Captured,
    signature: Signature<Alg>,
}

impl<Alg> SignedData<Alg> {
    pub fn new(data: Captured, signature: Signature<Alg>) -> Self {
        Self { data, signature }
    }

    pub fn data(&self) -> &Captured {
        &self.data
    }

    pub fn signature(&self) -> &Signature<Alg> {
        &self.signature
    }
}

impl<Alg: SignatureAlgorithm> SignedData<Alg> {
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
                Alg::x509_take_from(cons)?,
                BitString::take_from(cons)?.octet_bytes()
            )
        })
    }

    pub fn encode_ref(&self) -> impl encode::Values + '_ {
        encode::sequence((
            &self.data,
            self.signature.algorithm().x509_encode(),
            SignatureValueContent(self).encode(),
        ))
    }

    pub fn verify_signature(
        &self,
        public_key: &PublicKey
    ) -> Result<(), SignatureVerificationError> {
        public_key.verify(self.data.as_slice(), &self.signature)
    }
}


/// The content of the signature value bit string.
#[derive(Clone, Copy, Debug)]
struct SignatureValueContent<'a, Alg>(&'a SignedData<Alg>);

impl<Alg> PrimitiveContent for SignatureValueContent<'_, Alg> {
    const TAG: Tag = Tag::BIT_STRING;

    fn encoded_len(&self, _: Mode) -> usize {
        self.0.signature.value().len() + 1
    }

    fn write_encoded<W: io::Write>(
        &self,
        _: Mode,
        target: &mut W
    ) -> Result<(), io::Error> {
        target.write_all(&[0u8])?;
        target.write_all(self.0.signature.value().as_ref())
    }
}


//------------ Time ----------------------------------------------------------

/// A point in time as used by certificates, CRLs and signed objects.
///
/// All times are in UTC and have a precision of whole seconds which is
/// what the ASN.1 encodings can carry.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time(DateTime<Utc>);

impl Time {
    pub fn new(dt: DateTime<Utc>) -> Self {
        Time(dt.with_nanosecond(0).unwrap_or(dt))
    }

    pub fn now() -> Self {
        Self::new(Utc::now())
    }

    /// Adds a duration or returns `None` if the result is out of range.
    pub fn checked_add(self, duration: TimeDelta) -> Option<Self> {
        self.0.checked_add_signed(duration).map(Self::new)
    }

    /// Creates a time from its components.
    ///
    /// # Panics
    ///
    /// Panics if the components do not describe a valid date and time.
    pub fn utc(
        year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32
    ) -> Self {
        match Self::from_parts((year, month, day, hour, min, sec)) {
            Ok(time) => time,
            Err(_) => panic!("invalid time components")
        }
    }

    pub fn take_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive(Self::from_primitive)
    }

    pub fn take_opt_from<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Option<Self>, DecodeError<S::Error>> {
        cons.take_opt_primitive(Self::from_primitive)
    }

    /// Takes a time that has to be encoded as a GeneralizedTime.
    pub fn take_generalized_time<S: decode::Source>(
        cons: &mut decode::Constructed<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        cons.take_primitive_if(Tag::GENERALIZED_TIME, Self::from_generalized)
    }

    fn from_primitive<S: decode::Source>(
        tag: Tag,
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        if tag == Tag::UTC_TIME {
            // RFC 5280 requires the format YYMMDDHHMMSSZ
            let year = read_digits(prim, 2)? as i32;
            let year = if year >= 50 { year + 1900 }
                       else { year + 2000 };
            Self::take_rest(prim, year)
        }
        else if tag == Tag::GENERALIZED_TIME {
            Self::from_generalized(prim)
        }
        else {
            Err(prim.content_err("malformed time value"))
        }
    }

    fn from_generalized<S: decode::Source>(
        prim: &mut decode::Primitive<S>
    ) -> Result<Self, DecodeError<S::Error>> {
        // RFC 5280 requires the format YYYYMMDDHHMMSSZ
        let year = read_digits(prim, 4)? as i32;
        Self::take_rest(prim, year)
    }

    fn take_rest<S: decode::Source>(
        prim: &mut decode::Primitive<S>,
        year: i32
    ) -> Result<Self, DecodeError<S::Error>> {
        let res = (
            year,
            read_digits(prim, 2)?,
            read_digits(prim, 2)?,
            read_digits(prim, 2)?,
            read_digits(prim, 2)?,
            read_digits(prim, 2)?,
        );
        if prim.take_u8()? != b'Z' {
            return Err(prim.content_err("malformed time value"))
        }
        Self::from_parts(res).map_err(|err| prim.content_err(err))
    }

    fn from_parts(
        parts: (i32, u32, u32, u32, u32, u32)
    ) -> Result<Self, ContentError> {
        match Utc.with_ymd_and_hms(
            parts.0, parts.1, parts.2, parts.3, parts.4, parts.5
        ) {
            LocalResult::Single(dt) => Ok(Time(dt)),
            _ => Err(ContentError::from_static("malformed time value"))
        }
    }

    pub fn encode_utc_time(self) -> impl encode::Values {
        UtcTime(self).encode()
    }

    pub fn encode_generalized_time(self) -> impl encode::Values {
        GeneralizedTime(self).encode()
    }

    /// Encodes the time the way RFC 5280 wants it for certificates.
    ///
    /// Years between 1950 and 2049 use UTCTime, everything else
    /// GeneralizedTime.
    pub fn encode_varied(self) -> impl encode::Values {
        if self.year() < 1950 || self.year() > 2049 {
            (None, Some(self.encode_generalized_time()))
        }
        else {
            (Some(self.encode_utc_time()), None)
        }
    }
}


//--- Deref and AsRef

impl ops::Deref for Time {
    type Target = DateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<DateTime<Utc>> for Time {
    fn as_ref(&self) -> &DateTime<Utc> {
        &self.0
    }
}


//--- From

impl From<DateTime<Utc>> for Time {
    fn from(time: DateTime<Utc>) -> Self {
        Time::new(time)
    }
}

impl From<Time> for DateTime<Utc> {
    fn from(time: Time) -> Self {
        time.0
    }
}


//--- Add and Sub

impl ops::Add<TimeDelta> for Time {
    type Output = Self;

    fn add(self, duration: TimeDelta) -> Self::Output {
        Self::new(self.0 + duration)
    }
}

impl ops::Sub<TimeDelta> for Time {
    type Output = Self;

    fn sub(self, duration: TimeDelta) -> Self::Output {
        Self::new(self.0 - duration)
    }
}

impl ops::Sub<Time> for Time {
    type Output = TimeDelta;

    fn sub(self, other: Time) -> TimeDelta {
        self.0 - other.0
    }
}


//--- Display

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}


fn read_digits<S: decode::Source>(
    prim: &mut decode::Primitive<S>,
    count: usize,
) -> Result<u32, DecodeError<S::Error>> {
    let mut res = 0;
    for _ in 0..count {
        let ch = prim.take_u8()?;
        if !ch.is_ascii_digit() {
            return Err(prim.content_err("malformed time value"))
        }
        res = res * 10 + u32::from(ch - b'0');
    }
    Ok(res)
}


//------------ UtcTime -------------------------------------------------------

struct UtcTime(Time);

impl PrimitiveContent for UtcTime {
    const TAG: Tag = Tag::UTC_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        13 // yyMMddhhmmssZ
    }

    fn write_encoded<W: io::Write>(
        &self, _: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        write!(
            target, "{:02}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year() % 100, self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        )
    }
}


//------------ GeneralizedTime -----------------------------------------------

struct GeneralizedTime(Time);

impl PrimitiveContent for GeneralizedTime {
    const TAG: Tag = Tag::GENERALIZED_TIME;

    fn encoded_len(&self, _: Mode) -> usize {
        15 // yyyyMMddhhmmssZ
    }

    fn write_encoded<W: io::Write>(
        &self, _: Mode, target: &mut W
    ) -> Result<(), io::Error> {
        write!(
            target, "{:04}{:02}{:02}{:02}{:02}{:02}Z",
            self.0.year(), self.0.month(), self.0.day(),
            self.0.hour(), self.0.minute(), self.0.second()
        )
    }
}


//------------ Validity ------------------------------------------------------

/// The validity period of a certificate.
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

    /// Creates a validity starting now and lasting for `duration`.
    pub fn from_duration(duration: TimeDelta) -> Self {
        let now = Time::now();
        Validity::new(now, now + duration)
    }

    pub fn not_before(self) -> Time {
        self.not_before
    }

    pub fn not_after(self) -> Time {
        self.not_after
    }

    /// Returns whether `now` is within the period, bounds included.
    pub fn contains(self, now: Time) -> bool {
        self.not_before <= now && now <= self.not_after
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

    pub fn encode(self) -> impl encode::Values {
        encode::sequence((
            self.not_before.encode_varied(),
            self.not_after.encode_varied(),
        ))
    }
}


//------------ SerialSliceError ----------------------------------------------

/// A serial number’s octets were not acceptable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SerialSliceError {
    Empty,
    Long,
}

impl SerialSliceError {
    fn as_str(self) -> &'static str {
        match self {
            SerialSliceError::Empty => "empty serial number",
            SerialSliceError::Long => "serial number longer than 20 bytes",
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


//------------ RepresentationError -------------------------------------------

/// A source value is not correctly formated for converting into a value.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RepresentationError;

impl fmt::Display for RepresentationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("wrong representation format")
    }
}

impl error::Error for RepresentationError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use bcder::decode::Constructed;
    use bcder::encode::Values;

    fn attribute(id: &'static ConstOid, value: &'static [u8]) -> Captured {
        encode::set(
            encode::sequence((
                id.encode(),
                OctetString::encode_slice_as(value, Tag::PRINTABLE_STRING),
            ))
        ).to_captured(Mode::Der)
    }

    #[test]
    fn rpki_names() {
        assert!(Name::from_common_name("ca-1").is_rpki_name());
        assert!(!Name::from_common_name("ca_1").is_rpki_name());

        let cn_and_sn = Name(Captured::from_values(
            Mode::Der,
            encode::sequence((
                attribute(&oid::AT_COMMON_NAME, b"ca"),
                attribute(&oid::AT_SERIAL_NUMBER, b"1"),
            ))
        ));
        assert!(cn_and_sn.is_rpki_name());

        let two_cns = Name(Captured::from_values(Mode::Der, encode::sequence((
            attribute(&oid::AT_COMMON_NAME, b"a"),
            attribute(&oid::AT_COMMON_NAME, b"b"),
        ))));
        assert!(!two_cns.is_rpki_name());

        let no_cn = Name(Captured::from_values(Mode::Der, encode::sequence(
            attribute(&oid::AT_SERIAL_NUMBER, b"1"),
        )));
        assert!(!no_cn.is_rpki_name());
    }

    #[test]
    fn serial_from_slice() {
        assert_eq!(
            Serial::from_slice(b"\x01\x02\x03").unwrap(),
            Serial::from(0x10203u64)
        );
        assert_eq!(
            Serial::from_slice(b"\x00\x81").unwrap().into_array()[19],
            0x81
        );
        assert_eq!(
            Serial::from_slice(&[0xFF; 20]),
            Err(SerialSliceError::Long)
        );
        assert_eq!(Serial::from_slice(b""), Err(SerialSliceError::Empty));
    }

    #[test]
    fn serial_take_from() {
        assert_eq!(
            Constructed::decode(
                b"\x02\x03\x01\x02\x03".as_ref(),
                Mode::Der,
                Serial::take_from
            ).unwrap(),
            Serial::from(0x10203u64)
        );
    }

    #[test]
    fn serial_decimal() {
        assert_eq!(
            Serial::from_str("383822").unwrap(), Serial::from(383822u64)
        );
        assert_eq!(Serial::from(383822u64).to_string(), "383822");
        assert_eq!(Serial::default().to_string(), "0");
        assert_eq!(
            Serial::from_str("17085962136030120322").unwrap(),
            Serial::from_slice(b"\xed\x1d\x88\x09\x93\xd9\x89\x82").unwrap()
        );
        assert!(Serial::from_str(
            "730750818665451459101842416358141509827966271488"
        ).is_err());
        assert!(Serial::from_str("hello").is_err());
        assert!(Serial::from_str("").is_err());
    }

    #[test]
    fn serial_encode() {
        let mut target = Vec::new();
        Serial::from(0x10203u64).encode()
            .write_encoded(Mode::Der, &mut target).unwrap();
        assert_eq!(target, b"\x02\x03\x01\x02\x03");

        let mut target = Vec::new();
        Serial::from(0x810203u64).encode()
            .write_encoded(Mode::Der, &mut target).unwrap();
        assert_eq!(target, b"\x02\x04\x00\x81\x02\x03");
    }

    #[test]
    fn time_encode_decode() {
        let time = Time::utc(2021, 2, 3, 4, 5, 6);
        let utc = time.encode_varied().to_captured(Mode::Der);
        assert_eq!(utc.as_slice(), b"\x17\x0d210203040506Z");
        assert_eq!(utc.clone().decode(Time::take_from).unwrap(), time);

        let late = Time::utc(2051, 2, 3, 4, 5, 6);
        let gen = late.encode_varied().to_captured(Mode::Der);
        assert_eq!(gen.as_slice(), b"\x18\x0f20510203040506Z");
        assert_eq!(gen.clone().decode(Time::take_from).unwrap(), late);
        assert_eq!(late.to_string(), "2051-02-03T04:05:06Z");

        assert_eq!(
            gen.decode(Time::take_generalized_time).unwrap(), late
        );
        assert!(utc.decode(Time::take_generalized_time).is_err());

        assert_eq!(
            time.checked_add(TimeDelta::days(1)),
            Some(Time::utc(2021, 2, 4, 4, 5, 6))
        );
        assert_eq!(time.checked_add(TimeDelta::MAX), None);

        assert!(
            Constructed::decode(
                b"\x18\x0f20511303040506Z".as_ref(), Mode::Der,
                Time::take_from
            ).is_err()
        );
    }

    #[test]
    fn name_display_and_eq() {
        let name = Name::from_common_name("root");
        assert_eq!(name.to_string(), "CN=root");
        let decoded = Captured::from_values(
            Mode::Der, name.encode_ref()
        ).decode(Name::take_from).unwrap();
        assert_eq!(decoded, name);
        assert_ne!(decoded, Name::from_common_name("other"));
    }
}
