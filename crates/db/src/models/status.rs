//! Status helper enums mapping to SMALLSERIAL/SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

use faceswap_core::fusion_state::FusionState;

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }

            /// Look up a variant by its database status ID.
            pub fn from_id(id: StatusId) -> Option<Self> {
                [$( Self::$variant ),+].into_iter().find(|s| s.id() == id)
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// Fusion job lifecycle status (`fusion_job_statuses`).
    FusionJobStatus {
        Submitted = 1,
        Polling = 2,
        Succeeded = 3,
        Failed = 4,
        Cancelled = 5,
    }
}

impl From<FusionState> for FusionJobStatus {
    fn from(state: FusionState) -> Self {
        match state {
            FusionState::Submitted => Self::Submitted,
            FusionState::Polling => Self::Polling,
            FusionState::Succeeded => Self::Succeeded,
            FusionState::Failed => Self::Failed,
            FusionState::Cancelled => Self::Cancelled,
        }
    }
}

impl From<FusionJobStatus> for FusionState {
    fn from(status: FusionJobStatus) -> Self {
        match status {
            FusionJobStatus::Submitted => Self::Submitted,
            FusionJobStatus::Polling => Self::Polling,
            FusionJobStatus::Succeeded => Self::Succeeded,
            FusionJobStatus::Failed => Self::Failed,
            FusionJobStatus::Cancelled => Self::Cancelled,
        }
    }
}
