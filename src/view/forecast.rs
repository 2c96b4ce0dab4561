/// Forecast band drawn by the prediction panel
pub const HORIZON_MINUTES: u32 = 15;
pub const UNCERTAINTY: f64 = 1.2;

/// Lower bound, mean and upper bound at one point of the horizon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandPoint {
    pub minute: u32,
    pub lower: f64,
    pub mean: f64,
    pub upper: f64,
}

/// Straight band from one degree under the prediction now up to the
/// prediction at the end of the horizon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastBand {
    pub predicted: f64,
    pub horizon_minutes: u32,
    pub uncertainty: f64,
}

impl ForecastBand {
    pub fn new(predicted: f64) -> Self {
        Self {
            predicted,
            horizon_minutes: HORIZON_MINUTES,
            uncertainty: UNCERTAINTY,
        }
    }

    /// Linearly interpolated band at `minute`, clamped to the horizon
    pub fn at(&self, minute: u32) -> BandPoint {
        let minute = minute.min(self.horizon_minutes);
        let progress = if self.horizon_minutes == 0 {
            1.0
        } else {
            minute as f64 / self.horizon_minutes as f64
        };
        let mean = self.predicted - 1.0 + progress;
        BandPoint {
            minute,
            lower: mean - self.uncertainty,
            mean,
            upper: mean + self.uncertainty,
        }
    }

    pub fn start(&self) -> BandPoint {
        self.at(0)
    }

    pub fn end(&self) -> BandPoint {
        self.at(self.horizon_minutes)
    }
}
