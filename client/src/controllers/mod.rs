//! View-local data controllers, one per dashboard variant.
//!
//! Each controller owns its loading flag, surfaced error and datasets, and
//! follows the same contract: switching the active sub-view triggers a fresh
//! fetch of only the data that sub-view needs; every successful mutation
//! reloads the current view's dataset from scratch (no optimistic patching),
//! and a failed mutation leaves the datasets untouched apart from exactly
//! one surfaced error message.
//!
//! Fetches are tagged: beginning a load hands out a [`LoadTicket`] carrying
//! the selection key and an epoch counter, and results are applied back
//! through an `apply` method that discards tickets whose epoch no longer
//! matches. A slow response for a previously selected view can therefore
//! never overwrite a later view's state.

pub mod admin;
pub mod student;
pub mod teacher;

pub use self::admin::AdminController;
pub use self::student::StudentController;
pub use self::teacher::TeacherController;

use crate::router::ViewKey;

/// Tag for an in-flight fetch: the sub-view it was issued for and the
/// controller epoch at issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub view: ViewKey,
    pub epoch: u64,
}
