mod constant_gradient;
mod equilibrium;
mod historical;
mod period;
mod temperature_bias;

pub use constant_gradient::{ConstantGradientMassBalance, ConstantGradientParameters};
pub use equilibrium::EquilibriumMassBalance;
pub use historical::HistoricalMassBalance;
pub use period::ReferencePeriod;
pub use temperature_bias::TemperatureBiasMassBalance;
