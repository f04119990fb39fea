//! Ambient light loop
//!
//! [`AmbientDriver`] repeatedly samples a [`ColorSource`] and sends the color
//! to one RGBW group as a true color. It checks a [`CancellationToken`] once
//! per iteration; an in-flight sample or send always completes. On
//! cancellation the lights keep their last color. The first failing sample
//! or send ends the loop and is returned to the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use milight_control::pacing::{Clock, SystemClock};
use milight_control::{Color, CommandSink, Controller, Group};
use tracing::{debug, info, warn};

use crate::error::{AmbientError, Result};
use crate::sampler::ColorSource;

/// Default pause between iterations
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(100);

/// Shared stop flag for a running loop
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after its current iteration.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbientConfig {
    /// RGBW group to drive (0 = all)
    pub group: u8,
    /// Pause after each iteration
    pub period: Duration,
}

impl Default for AmbientConfig {
    fn default() -> Self {
        Self {
            group: 0,
            period: DEFAULT_PERIOD,
        }
    }
}

/// Sample-and-send loop for one receiver
pub struct AmbientDriver<C: ColorSource, S: CommandSink> {
    source: C,
    controller: Controller<S>,
    group: Group,
    period: Duration,
    clock: Arc<dyn Clock>,
    iterations: u64,
    last_color: Option<Color>,
}

impl<C: ColorSource, S: CommandSink> AmbientDriver<C, S> {
    /// Validates the group before anything is sampled or sent.
    pub fn new(source: C, controller: Controller<S>, config: AmbientConfig) -> Result<Self> {
        let group = Group::new(config.group)?;
        if config.period.is_zero() {
            return Err(AmbientError::InvalidParameter(
                "ambient period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            source,
            controller,
            group,
            period: config.period,
            clock: Arc::new(SystemClock),
            iterations: 0,
            last_color: None,
        })
    }

    /// Use another clock for the pause between iterations
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// One sample and send, without the pause.
    pub fn step(&mut self) -> Result<Color> {
        let color = self.source.sample()?;
        self.controller
            .rgbw()
            .set_true_color(self.group.number(), color)?;
        self.iterations += 1;
        self.last_color = Some(color);
        Ok(color)
    }

    /// Run until `token` is cancelled or an iteration fails.
    pub fn run(&mut self, token: &CancellationToken) -> Result<()> {
        info!(
            "Ambient loop started for RGBW {} (period {:?})",
            self.group, self.period
        );

        while !token.is_cancelled() {
            match self.step() {
                Ok(color) => debug!("Ambient color {}", color),
                Err(e) => {
                    warn!("Ambient loop stopped after {} iterations: {}", self.iterations, e);
                    return Err(e);
                }
            }
            self.clock.sleep(self.period);
        }

        info!("Ambient loop cancelled after {} iterations", self.iterations);
        Ok(())
    }

    pub fn group(&self) -> Group {
        self.group
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Completed iterations so far
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Color sent by the last completed iteration
    pub fn last_color(&self) -> Option<Color> {
        self.last_color
    }

    pub fn source(&self) -> &C {
        &self.source
    }

    pub fn controller(&self) -> &Controller<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<S> {
        &mut self.controller
    }

    /// Give back the color source and the controller.
    pub fn into_parts(self) -> (C, Controller<S>) {
        (self.source, self.controller)
    }
}

impl<C, S> AmbientDriver<C, S>
where
    C: ColorSource + Send + 'static,
    S: CommandSink + Send + 'static,
{
    /// Run the loop on its own thread.
    pub fn spawn(self) -> Result<AmbientHandle<C, S>> {
        let token = CancellationToken::new();
        let worker_token = token.clone();
        let mut driver = self;

        let thread = thread::Builder::new()
            .name("ambient-loop".to_string())
            .spawn(move || {
                let result = driver.run(&worker_token);
                AmbientExit { driver, result }
            })
            .map_err(|e| AmbientError::Worker(format!("spawning thread: {}", e)))?;

        Ok(AmbientHandle { token, thread })
    }
}

/// How a spawned loop ended, with the driver handed back
pub struct AmbientExit<C: ColorSource, S: CommandSink> {
    pub driver: AmbientDriver<C, S>,
    /// `Ok` when cancelled, otherwise the error that stopped the loop
    pub result: Result<()>,
}

/// Handle to a loop running on its own thread
pub struct AmbientHandle<C: ColorSource, S: CommandSink> {
    token: CancellationToken,
    thread: JoinHandle<AmbientExit<C, S>>,
}

impl<C: ColorSource, S: CommandSink> AmbientHandle<C, S> {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True once the loop has returned, e.g. after an error
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the loop to end. Errors only if the worker panicked.
    pub fn join(self) -> Result<AmbientExit<C, S>> {
        self.thread
            .join()
            .map_err(|_| AmbientError::Worker("ambient thread panicked".to_string()))
    }

    /// Cancel and wait.
    pub fn stop(self) -> Result<AmbientExit<C, S>> {
        self.cancel();
        self.join()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milight_control::{ControlError, ManualClock, RecordingSink};

    struct Fixed(Color);

    impl ColorSource for Fixed {
        fn sample(&mut self) -> Result<Color> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_invalid_group_rejected_up_front() {
        let config = AmbientConfig {
            group: 5,
            ..Default::default()
        };
        let result = AmbientDriver::new(Fixed(Color::WHITE), Controller::new(RecordingSink::new()), config);
        assert!(matches!(
            result,
            Err(AmbientError::Control(ControlError::InvalidGroup(5)))
        ));
    }

    #[test]
    fn test_zero_period_rejected() {
        let config = AmbientConfig {
            group: 1,
            period: Duration::ZERO,
        };
        let result = AmbientDriver::new(Fixed(Color::WHITE), Controller::new(RecordingSink::new()), config);
        assert!(matches!(result, Err(AmbientError::InvalidParameter(_))));
    }

    #[test]
    fn test_cancelled_before_start_sends_nothing() {
        let mut driver = AmbientDriver::new(
            Fixed(Color::new(255, 0, 0)),
            Controller::new(RecordingSink::new()),
            AmbientConfig::default(),
        )
        .unwrap()
        .with_clock(Arc::new(ManualClock::new()));

        let token = CancellationToken::new();
        token.cancel();
        driver.run(&token).unwrap();

        assert_eq!(driver.iterations(), 0);
        assert!(driver.controller().sink().commands().is_empty());
    }

    #[test]
    fn test_step_sends_true_color() {
        let mut driver = AmbientDriver::new(
            Fixed(Color::new(255, 0, 0)),
            Controller::new(RecordingSink::new()),
            AmbientConfig {
                group: 2,
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(driver.step().unwrap(), Color::new(255, 0, 0));
        let sent: Vec<[u8; 3]> = driver
            .controller()
            .sink()
            .commands()
            .iter()
            .map(|c| *c.as_bytes())
            .collect();
        assert_eq!(sent, vec![[0x47, 0x00, 0x55], [0x40, 0xB0, 0x55], [0x4E, 14, 0x55]]);
        assert_eq!(driver.last_color(), Some(Color::new(255, 0, 0)));
    }

    #[test]
    fn test_token_is_shared() {
        let token = CancellationToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }
}
