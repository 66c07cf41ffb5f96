use helpers::general::round_millis;

/// RaceClock measures the elapsed time of the current run. Timestamps are host frame timestamps
/// in milliseconds, the readout is in seconds with three decimal places.
#[derive(Debug)]
pub struct RaceClock {
    period_ms: f64,
    running: bool,
    t_start: Option<f64>,
    t_next_sample: f64,
    elapsed: f64,
}

impl RaceClock {
    /// The sampling period is at least 1 ms.
    pub fn new(period_ms: u64) -> RaceClock {
        RaceClock {
            period_ms: period_ms.max(1) as f64,
            running: false,
            t_start: None,
            t_next_sample: 0.0,
            elapsed: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// elapsed returns the last sampled value without sampling.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// start captures the start instant and begins periodic sampling. Returns false if the clock
    /// was already running.
    pub fn start(&mut self, now: f64) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.t_start = Some(now);
        self.elapsed = 0.0;
        self.t_next_sample = now + self.period_ms;
        true
    }

    /// sample returns the elapsed time in seconds. A stopped clock returns its last value.
    pub fn sample(&mut self, now: f64) -> f64 {
        if !self.running {
            return self.elapsed;
        }
        let t_start = *self.t_start.get_or_insert(now);
        let elapsed = round_millis(((now - t_start) / 1000.0).max(0.0));
        if elapsed > self.elapsed {
            self.elapsed = elapsed;
        }
        self.elapsed
    }

    /// tick samples the clock if a sampling period has passed since the last periodic sample.
    pub fn tick(&mut self, now: f64) -> Option<f64> {
        if !self.running || now < self.t_next_sample {
            return None;
        }
        while self.t_next_sample <= now {
            self.t_next_sample += self.period_ms;
        }
        Some(self.sample(now))
    }

    /// stop halts periodic sampling. Returns false if the clock was not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        true
    }

    /// reset sets the readout to 0.000 and forgets the start instant. Returns false if there was
    /// nothing to reset.
    pub fn reset(&mut self) -> bool {
        if self.t_start.is_none() && self.elapsed == 0.0 {
            return false;
        }
        self.t_start = None;
        self.elapsed = 0.0;
        true
    }
}
