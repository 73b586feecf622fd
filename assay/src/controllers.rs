mod ramp;

pub(crate) use ramp::RampController;
