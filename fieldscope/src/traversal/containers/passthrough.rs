//! Leaf `ScopedContainer` implementations for scalar-like types.

use std::{
    borrow::Cow,
    marker::PhantomData,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6},
    num::{
        NonZeroI8, NonZeroI16, NonZeroI32, NonZeroI64, NonZeroI128, NonZeroIsize, NonZeroU8,
        NonZeroU16, NonZeroU32, NonZeroU64, NonZeroU128, NonZeroUsize,
    },
    path::PathBuf,
    time::{Duration, SystemTime},
};

use serde_json::Value;

use super::impl_scoped_container_leaf;
use crate::{
    error::ScopeError,
    traversal::{ScopeContext, ScopedContainer, to_leaf},
};

// =============================================================================
// Leaf implementations (scalars and primitives)
// =============================================================================

impl_scoped_container_leaf!(String);
impl_scoped_container_leaf!(bool);
impl_scoped_container_leaf!(char);

// Signed integers
impl_scoped_container_leaf!(i8);
impl_scoped_container_leaf!(i16);
impl_scoped_container_leaf!(i32);
impl_scoped_container_leaf!(i64);
impl_scoped_container_leaf!(i128);
impl_scoped_container_leaf!(isize);

// Unsigned integers
impl_scoped_container_leaf!(u8);
impl_scoped_container_leaf!(u16);
impl_scoped_container_leaf!(u32);
impl_scoped_container_leaf!(u64);
impl_scoped_container_leaf!(u128);
impl_scoped_container_leaf!(usize);

// Floating point
impl_scoped_container_leaf!(f32);
impl_scoped_container_leaf!(f64);

// Unit type
impl_scoped_container_leaf!(());

// =============================================================================
// NonZero integer leaf implementations
// =============================================================================

impl_scoped_container_leaf!(NonZeroI8);
impl_scoped_container_leaf!(NonZeroI16);
impl_scoped_container_leaf!(NonZeroI32);
impl_scoped_container_leaf!(NonZeroI64);
impl_scoped_container_leaf!(NonZeroI128);
impl_scoped_container_leaf!(NonZeroIsize);
impl_scoped_container_leaf!(NonZeroU8);
impl_scoped_container_leaf!(NonZeroU16);
impl_scoped_container_leaf!(NonZeroU32);
impl_scoped_container_leaf!(NonZeroU64);
impl_scoped_container_leaf!(NonZeroU128);
impl_scoped_container_leaf!(NonZeroUsize);

// =============================================================================
// std::time, std::net and std::path leaf implementations
// =============================================================================

impl_scoped_container_leaf!(Duration);
impl_scoped_container_leaf!(SystemTime);

impl_scoped_container_leaf!(IpAddr);
impl_scoped_container_leaf!(Ipv4Addr);
impl_scoped_container_leaf!(Ipv6Addr);
impl_scoped_container_leaf!(SocketAddr);
impl_scoped_container_leaf!(SocketAddrV4);
impl_scoped_container_leaf!(SocketAddrV6);

impl_scoped_container_leaf!(PathBuf);

// =============================================================================
// Other std leaf implementations
// =============================================================================

impl<T: ?Sized> ScopedContainer for PhantomData<T> {
    fn filter_with(&self, _ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        Ok(Value::Null)
    }

    fn sanitize_with(&mut self, _ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        Ok(())
    }
}

impl ScopedContainer for Cow<'_, str> {
    fn filter_with(&self, _ctx: &ScopeContext<'_>) -> Result<Value, ScopeError> {
        to_leaf(self.as_ref())
    }

    fn sanitize_with(&mut self, _ctx: &ScopeContext<'_>) -> Result<(), ScopeError> {
        Ok(())
    }
}

// =============================================================================
// Date/time leaf implementations (feature-gated)
// =============================================================================

#[cfg(feature = "chrono")]
mod chrono_leaves {
    use chrono::{
        DateTime, Duration, FixedOffset, Local, Month, NaiveDate, NaiveDateTime, NaiveTime, Utc,
        Weekday,
    };

    use super::impl_scoped_container_leaf;

    // DateTime variants
    impl_scoped_container_leaf!(DateTime<Utc>);
    impl_scoped_container_leaf!(DateTime<Local>);
    impl_scoped_container_leaf!(DateTime<FixedOffset>);

    // Naive date/time types
    impl_scoped_container_leaf!(NaiveDateTime);
    impl_scoped_container_leaf!(NaiveDate);
    impl_scoped_container_leaf!(NaiveTime);

    // Duration (TimeDelta is an alias for Duration)
    impl_scoped_container_leaf!(Duration);

    // Calendar enums
    impl_scoped_container_leaf!(Month);
    impl_scoped_container_leaf!(Weekday);
}

#[cfg(feature = "time")]
mod time_leaves {
    use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset, Weekday};

    use super::impl_scoped_container_leaf;

    impl_scoped_container_leaf!(OffsetDateTime);
    impl_scoped_container_leaf!(PrimitiveDateTime);
    impl_scoped_container_leaf!(Date);
    impl_scoped_container_leaf!(Time);
    impl_scoped_container_leaf!(Duration);
    impl_scoped_container_leaf!(UtcOffset);
    impl_scoped_container_leaf!(Month);
    impl_scoped_container_leaf!(Weekday);
}

// =============================================================================
// UUID leaf implementation (feature-gated)
// =============================================================================

#[cfg(feature = "uuid")]
mod uuid_leaves {
    use uuid::Uuid;

    use super::impl_scoped_container_leaf;

    impl_scoped_container_leaf!(Uuid);
}
