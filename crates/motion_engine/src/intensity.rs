//! Selection of the numeric path that drives classification.

use contracts::{ActivityReading, CadenceReading, IntensityMode};

/// Value and evidence handed to the classifier
pub trait IntensitySource: Send + std::fmt::Debug {
    fn mode(&self) -> IntensityMode;

    /// Classifier input
    fn value(&self, cadence: &CadenceReading, activity: &ActivityReading) -> f64;

    /// History length backing the value, for the commit evidence gate
    fn evidence(&self, cadence: &CadenceReading, activity: &ActivityReading) -> usize;
}

/// Rounded smoothed cadence, backed by the step history
#[derive(Debug, Clone, Copy, Default)]
pub struct CadenceIntensity;

impl IntensitySource for CadenceIntensity {
    fn mode(&self) -> IntensityMode {
        IntensityMode::Cadence
    }

    fn value(&self, cadence: &CadenceReading, _activity: &ActivityReading) -> f64 {
        f64::from(cadence.rounded)
    }

    fn evidence(&self, cadence: &CadenceReading, _activity: &ActivityReading) -> usize {
        cadence.history_len
    }
}

/// Smoothed normalized activity, backed by the sample window
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivityIntensity;

impl IntensitySource for ActivityIntensity {
    fn mode(&self) -> IntensityMode {
        IntensityMode::Activity
    }

    fn value(&self, _cadence: &CadenceReading, activity: &ActivityReading) -> f64 {
        activity.level
    }

    fn evidence(&self, _cadence: &CadenceReading, activity: &ActivityReading) -> usize {
        activity.window_len
    }
}

pub fn intensity_source(mode: IntensityMode) -> Box<dyn IntensitySource> {
    match mode {
        IntensityMode::Cadence => Box::new(CadenceIntensity),
        IntensityMode::Activity => Box::new(ActivityIntensity),
    }
}
