//! The mass-balance model interface
//!
//! A mass-balance model maps surface elevations (and, for time-varying models,
//! a year) to the local mass-balance rate in metres of ice per second, the unit
//! expected by the flow model.

use crate::errors::MBResult;
use crate::FloatValue;
use ndarray::{Array1, ArrayView1};
use std::fmt::Debug;

/// Elevation-dependent surface mass balance.
///
/// Models are serialisable as trait objects so a configured model can be
/// stored alongside a run.
#[typetag::serde(tag = "type")]
pub trait MassBalanceModel: Debug + Send + Sync {
    /// Set the bias applied by the model.
    ///
    /// How the bias enters the mass balance depends on the model.
    fn set_bias(&mut self, bias: FloatValue);

    /// The current bias.
    fn bias(&self) -> FloatValue;

    /// Mass-balance rate (m ice s-1) at each of `heights`.
    ///
    /// `year` is ignored by models whose climate does not vary in time.
    /// Elevations outside the range the model was built for are extrapolated.
    fn get_mb(
        &mut self,
        heights: ArrayView1<FloatValue>,
        year: Option<FloatValue>,
    ) -> MBResult<Array1<FloatValue>>;
}
