pub mod v1;

pub mod prelude {
    pub use crate::v1::aws::{
        lambda::invoke::*,
        sts::assume_role::*,
        *,
    };
    pub use crate::v1::config::*;
    pub use crate::v1::error::*;
    pub use crate::v1::solutions::relay::*;
    pub use crate::v1::telemetry;
}
