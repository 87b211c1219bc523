//! Tagged values carried by structured log fields
//!
//! A [`Value`] holds one of a closed set of [`Kind`]s inline. Recognized scalar
//! types, times, durations and IP addresses are stored without heap allocation;
//! anything else is boxed into [`Kind::Any`].

use super::error::{LoggerError, Result};
use super::text::SharedStr;
use chrono::{DateTime, FixedOffset, Local, SecondsFormat, TimeDelta, Utc};
use serde::{Serialize, Serializer};
use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;

/// Closed set of variants a [`Value`] can hold.
///
/// Adding a kind is a breaking change to the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    Null,
    Any,
    Bool,
    Int64,
    Uint64,
    Float64,
    Complex128,
    String,
    Duration,
    Time,
    IpAddr,
    IpPrefix,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Null => "Null",
            Kind::Any => "Any",
            Kind::Bool => "Bool",
            Kind::Int64 => "Int64",
            Kind::Uint64 => "Uint64",
            Kind::Float64 => "Float64",
            Kind::Complex128 => "Complex128",
            Kind::String => "String",
            Kind::Duration => "Duration",
            Kind::Time => "Time",
            Kind::IpAddr => "IpAddr",
            Kind::IpPrefix => "IpPrefix",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload accepted by [`Kind::Any`].
///
/// Implemented for every `Debug + Send + Sync + 'static` type; the `Debug`
/// output is used as the best-effort rendering.
pub trait AnyValue: Any + fmt::Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + fmt::Debug + Send + Sync> AnyValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Complex number with both components kept as raw `f64` bit patterns.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    fn bits(&self) -> (u64, u64) {
        (self.re.to_bits(), self.im.to_bits())
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_float(f, self.re)?;
        // the imaginary part always carries a sign
        if self.im.is_nan() || (self.im.is_finite() && self.im.is_sign_positive()) {
            f.write_str("+")?;
        }
        write_float(f, self.im)?;
        f.write_str("i)")
    }
}

/// IP network prefix such as `10.0.0.0/8` or `2001:db8::/32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpPrefix {
    addr: IpAddr,
    prefix_len: u8,
}

impl IpPrefix {
    /// Create a prefix, rejecting lengths longer than the address family allows.
    pub fn new(addr: IpAddr, prefix_len: u8) -> Result<Self> {
        let max = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix_len > max {
            return Err(LoggerError::invalid_prefix(
                format!("{}/{}", addr, prefix_len),
                format!("prefix length must be at most {}", max),
            ));
        }
        Ok(Self { addr, prefix_len })
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }
}

impl fmt::Display for IpPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

impl FromStr for IpPrefix {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, len) = s
            .split_once('/')
            .ok_or_else(|| LoggerError::invalid_prefix(s, "missing '/'"))?;
        let addr: IpAddr = addr
            .parse()
            .map_err(|e: std::net::AddrParseError| LoggerError::invalid_prefix(s, e.to_string()))?;
        let len: u8 = len
            .parse()
            .map_err(|e: std::num::ParseIntError| LoggerError::invalid_prefix(s, e.to_string()))?;
        Self::new(addr, len)
    }
}

/// Tagged value stored in a [`Field`](super::field::Field).
///
/// Use the `From` conversions for recognized types, [`Value::capture`] for a
/// generic value whose type is only known at runtime, and [`Value::from_any`]
/// to box an arbitrary payload. Accessors return
/// [`LoggerError::KindMismatch`] when called against another kind.
#[derive(Debug, Clone)]
pub enum Value {
    /// Explicitly typed null, produced from an empty `Option`.
    Null,
    /// Boxed payload of an unrecognized type. `None` is the logical "null interface".
    Any(Option<Arc<dyn AnyValue>>),
    Bool(bool),
    Int64(i64),
    Uint64(u64),
    Float64(f64),
    Complex128(Complex),
    String(SharedStr),
    Duration(TimeDelta),
    Time(DateTime<FixedOffset>),
    IpAddr(IpAddr),
    IpPrefix(IpPrefix),
}

impl Default for Value {
    fn default() -> Self {
        Value::Any(None)
    }
}

impl Value {
    /// Box an arbitrary payload as [`Kind::Any`].
    pub fn from_any<T: AnyValue>(value: T) -> Self {
        Value::Any(Some(Arc::new(value)))
    }

    /// Convert a value of any type, recognizing supported kinds at runtime.
    ///
    /// Recognized types (and `Option`s of them) are stored inline without
    /// allocating; everything else is boxed into [`Kind::Any`].
    pub fn capture<T: AnyValue>(value: T) -> Self {
        let mut slot = Some(value);
        let recognized = recognize(&mut slot as &mut dyn Any);
        match recognized {
            Some(value) => value,
            None => match slot {
                Some(value) => Value::from_any(value),
                None => Value::Null,
            },
        }
    }

    /// Build a string value; owned text is moved into shared storage.
    pub fn string(value: impl Into<SharedStr>) -> Self {
        Value::String(value.into())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Any(_) => Kind::Any,
            Value::Bool(_) => Kind::Bool,
            Value::Int64(_) => Kind::Int64,
            Value::Uint64(_) => Kind::Uint64,
            Value::Float64(_) => Kind::Float64,
            Value::Complex128(_) => Kind::Complex128,
            Value::String(_) => Kind::String,
            Value::Duration(_) => Kind::Duration,
            Value::Time(_) => Kind::Time,
            Value::IpAddr(_) => Kind::IpAddr,
            Value::IpPrefix(_) => Kind::IpPrefix,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    fn mismatch(&self, expected: Kind) -> LoggerError {
        LoggerError::kind_mismatch(expected, self.kind())
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Bool)),
        }
    }

    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Value::Int64(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Int64)),
        }
    }

    pub fn as_u64(&self) -> Result<u64> {
        match self {
            Value::Uint64(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Uint64)),
        }
    }

    pub fn as_f64(&self) -> Result<f64> {
        match self {
            Value::Float64(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Float64)),
        }
    }

    pub fn as_complex(&self) -> Result<Complex> {
        match self {
            Value::Complex128(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Complex128)),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(v) => Ok(v.as_str()),
            _ => Err(self.mismatch(Kind::String)),
        }
    }

    pub fn as_duration(&self) -> Result<TimeDelta> {
        match self {
            Value::Duration(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Duration)),
        }
    }

    pub fn as_time(&self) -> Result<DateTime<FixedOffset>> {
        match self {
            Value::Time(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::Time)),
        }
    }

    pub fn as_ip_addr(&self) -> Result<IpAddr> {
        match self {
            Value::IpAddr(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::IpAddr)),
        }
    }

    pub fn as_ip_prefix(&self) -> Result<IpPrefix> {
        match self {
            Value::IpPrefix(v) => Ok(*v),
            _ => Err(self.mismatch(Kind::IpPrefix)),
        }
    }

    /// The boxed payload of an [`Kind::Any`] value; `Ok(None)` for the null interface.
    pub fn as_any(&self) -> Result<Option<&dyn AnyValue>> {
        match self {
            Value::Any(v) => Ok(v.as_deref()),
            _ => Err(self.mismatch(Kind::Any)),
        }
    }

    /// Downcast the boxed payload of an [`Kind::Any`] value.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Any(Some(v)) => (**v).as_any().downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Any(None), Value::Any(None)) => true,
            (Value::Any(Some(a)), Value::Any(Some(b))) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Uint64(a), Value::Uint64(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
            (Value::Complex128(a), Value::Complex128(b)) => a.bits() == b.bits(),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Duration(a), Value::Duration(b)) => a == b,
            (Value::Time(a), Value::Time(b)) => a == b && a.offset() == b.offset(),
            (Value::IpAddr(a), Value::IpAddr(b)) => a == b,
            (Value::IpPrefix(a), Value::IpPrefix(b)) => a == b,
            _ => false,
        }
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v == f64::INFINITY {
        f.write_str("+Inf")
    } else if v == f64::NEG_INFINITY {
        f.write_str("-Inf")
    } else {
        write!(f, "{}", v)
    }
}

fn write_duration(f: &mut fmt::Formatter<'_>, d: &TimeDelta) -> fmt::Result {
    let negative = *d < TimeDelta::zero();
    let magnitude = if negative { -*d } else { *d };
    match magnitude.to_std() {
        Ok(std) => {
            if negative {
                f.write_str("-")?;
            }
            write!(f, "{:?}", std)
        }
        Err(_) => write!(f, "{}", d),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Any(None) => f.write_str("<nil>"),
            Value::Any(Some(v)) => write!(f, "{:?}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Uint64(v) => write!(f, "{}", v),
            Value::Float64(v) => write_float(f, *v),
            Value::Complex128(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v.as_str()),
            Value::Duration(v) => write_duration(f, v),
            Value::Time(v) => f.write_str(&v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::IpAddr(v) => write!(f, "{}", v),
            Value::IpPrefix(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null | Value::Any(None) => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int64(v) => serializer.serialize_i64(*v),
            Value::Uint64(v) => serializer.serialize_u64(*v),
            Value::Float64(v) if v.is_finite() => serializer.serialize_f64(*v),
            Value::String(v) => serializer.serialize_str(v.as_str()),
            _ => serializer.collect_str(self),
        }
    }
}

macro_rules! impl_from_copy {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $body
                }
            }

            impl From<&$ty> for Value {
                fn from(v: &$ty) -> Self {
                    Value::from(*v)
                }
            }
        )*
    };
}

impl_from_copy! {
    bool => |v| Value::Bool(v),
    i8 => |v| Value::Int64(i64::from(v)),
    i16 => |v| Value::Int64(i64::from(v)),
    i32 => |v| Value::Int64(i64::from(v)),
    i64 => |v| Value::Int64(v),
    isize => |v| Value::Int64(v as i64),
    u8 => |v| Value::Uint64(u64::from(v)),
    u16 => |v| Value::Uint64(u64::from(v)),
    u32 => |v| Value::Uint64(u64::from(v)),
    u64 => |v| Value::Uint64(v),
    usize => |v| Value::Uint64(v as u64),
    f32 => |v| Value::Float64(f64::from(v)),
    f64 => |v| Value::Float64(v),
    Complex => |v| Value::Complex128(v),
    TimeDelta => |v| Value::Duration(v),
    std::time::Duration => |v| Value::Duration(TimeDelta::from_std(v).unwrap_or(TimeDelta::MAX)),
    DateTime<FixedOffset> => |v| Value::Time(v),
    DateTime<Utc> => |v| Value::Time(v.fixed_offset()),
    DateTime<Local> => |v| Value::Time(v.fixed_offset()),
    SystemTime => |v| Value::Time(DateTime::<Utc>::from(v).fixed_offset()),
    IpAddr => |v| Value::IpAddr(v),
    Ipv4Addr => |v| Value::IpAddr(IpAddr::V4(v)),
    Ipv6Addr => |v| Value::IpAddr(IpAddr::V6(v)),
    IpPrefix => |v| Value::IpPrefix(v),
}

impl From<&'static str> for Value {
    fn from(v: &'static str) -> Self {
        Value::String(SharedStr::Static(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(SharedStr::from(v))
    }
}

impl From<Cow<'static, str>> for Value {
    fn from(v: Cow<'static, str>) -> Self {
        Value::String(SharedStr::from(v))
    }
}

impl From<Arc<str>> for Value {
    fn from(v: Arc<str>) -> Self {
        Value::String(SharedStr::Shared(v))
    }
}

impl From<SharedStr> for Value {
    fn from(v: SharedStr) -> Self {
        Value::String(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

/// Move a recognized value (or an `Option` of one) out of `slot`.
///
/// `slot` is always an `Option<T>`; on success it is left as `None`.
fn recognize(slot: &mut dyn Any) -> Option<Value> {
    macro_rules! take {
        ($($ty:ty),* $(,)?) => {
            $(
                if let Some(inner) = slot.downcast_mut::<Option<$ty>>() {
                    return inner.take().map(Value::from);
                }
                if let Some(inner) = slot.downcast_mut::<Option<Option<$ty>>>() {
                    return inner.take().map(Value::from);
                }
            )*
        };
    }

    if let Some(inner) = slot.downcast_mut::<Option<Value>>() {
        return inner.take();
    }

    take!(
        bool,
        i8,
        i16,
        i32,
        i64,
        isize,
        u8,
        u16,
        u32,
        u64,
        usize,
        f32,
        f64,
        Complex,
        &'static str,
        String,
        Cow<'static, str>,
        Arc<str>,
        SharedStr,
        TimeDelta,
        std::time::Duration,
        DateTime<FixedOffset>,
        DateTime<Utc>,
        DateTime<Local>,
        SystemTime,
        IpAddr,
        Ipv4Addr,
        Ipv6Addr,
        IpPrefix,
    );
    None
}
