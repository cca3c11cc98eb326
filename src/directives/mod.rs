mod log;
mod respond;
mod step;
mod stop;

pub use log::Log;
pub use respond::Respond;
pub use step::Step;
pub use stop::Stop;
