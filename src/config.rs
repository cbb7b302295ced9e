//! Configuration loading and management
//!
//! Every setting has a default matching the appliance build and can be
//! overridden through a `LARK_*` environment variable.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::audio::{self, DEFAULT_PRESENCE_THRESHOLD_BYTES};
use crate::content::DEFAULT_PREFIXES;

/// Longest value any duration setting may take
const MAX_SETTING: Duration = Duration::from_secs(60 * 60);

/// Which loops may start (or refresh) cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerSet {
    pub wake_word: bool,
    pub auto_demo: bool,
    pub refresher: bool,
    /// Line commands on stdin, the button build of the appliance
    pub manual: bool,
}

impl Default for TriggerSet {
    fn default() -> Self {
        Self {
            wake_word: true,
            auto_demo: true,
            refresher: true,
            manual: false,
        }
    }
}

impl FromStr for TriggerSet {
    type Err = anyhow::Error;

    /// Parse a comma list such as `wake,demo,refresh`
    fn from_str(s: &str) -> Result<Self> {
        let mut set = Self {
            wake_word: false,
            auto_demo: false,
            refresher: false,
            manual: false,
        };

        for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            match name {
                "wake" => set.wake_word = true,
                "demo" => set.auto_demo = true,
                "refresh" => set.refresher = true,
                "manual" => set.manual = true,
                other => bail!("unknown trigger `{other}`"),
            }
        }

        Ok(set)
    }
}

/// Fixed waits that make up one interaction cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTimings {
    /// Minimum length of the Listening phase, also the capture duration
    pub listen_window: Duration,
    /// Simulated recognition latency in Processing
    pub think_time: Duration,
    /// Hold after each rights line
    pub line_hold: Duration,
    /// Hold after the statute code announcement
    pub announce_hold: Duration,
    /// Hold after the statute description
    pub description_hold: Duration,
}

impl Default for CycleTimings {
    fn default() -> Self {
        Self {
            listen_window: Duration::from_secs(2),
            think_time: Duration::from_secs(2),
            line_hold: Duration::from_secs(3),
            announce_hold: Duration::from_secs(3),
            description_hold: Duration::from_secs(3),
        }
    }
}

impl CycleTimings {
    /// Longest the Listening phase waits on the audio gateway
    pub fn capture_limit(&self) -> Duration {
        audio::capture_limit(self.listen_window)
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub triggers: TriggerSet,
    pub timings: CycleTimings,

    /// Wake-word polling interval
    pub poll_interval: Duration,
    /// Length of each wake-word capture
    pub wake_capture: Duration,
    /// Idle time before the auto-demo starts a cycle
    pub idle_timeout: Duration,
    /// Idle clock refresh interval
    pub refresh_interval: Duration,

    /// Statute announced by the statute lookup script
    pub statute_code: String,
    /// Jurisdiction prefixes tried for bare statute numbers
    pub prefixes: Vec<String>,

    /// espeak voice
    pub voice: String,
    /// Recorder program
    pub recorder: String,
    /// Scratch file for captured audio
    pub audio_file: PathBuf,
    /// Recording size above which presence is assumed
    pub presence_threshold: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            triggers: TriggerSet::default(),
            timings: CycleTimings::default(),
            poll_interval: Duration::from_millis(500),
            wake_capture: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(15),
            refresh_interval: Duration::from_secs(1),
            statute_code: "14:98".to_string(),
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            voice: "en-us".to_string(),
            recorder: "arecord".to_string(),
            audio_file: std::env::temp_dir().join("lark_audio.wav"),
            presence_threshold: DEFAULT_PRESENCE_THRESHOLD_BYTES,
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let env = Env { lookup: &lookup };

        if let Some(triggers) = env.parse("LARK_TRIGGERS")? {
            config.triggers = triggers;
        }

        env.millis("LARK_POLL_INTERVAL_MS", &mut config.poll_interval)?;
        env.secs("LARK_WAKE_CAPTURE_SECS", &mut config.wake_capture)?;
        env.secs("LARK_IDLE_TIMEOUT_SECS", &mut config.idle_timeout)?;
        env.millis("LARK_REFRESH_INTERVAL_MS", &mut config.refresh_interval)?;

        env.secs("LARK_LISTEN_SECS", &mut config.timings.listen_window)?;
        env.millis("LARK_THINK_MS", &mut config.timings.think_time)?;
        env.millis("LARK_LINE_HOLD_MS", &mut config.timings.line_hold)?;
        env.millis("LARK_ANNOUNCE_HOLD_MS", &mut config.timings.announce_hold)?;
        env.millis("LARK_DESCRIPTION_HOLD_MS", &mut config.timings.description_hold)?;

        if let Some(code) = lookup("LARK_STATUTE") {
            config.statute_code = code.trim().to_string();
        }
        if let Some(prefixes) = lookup("LARK_PREFIXES") {
            config.prefixes = parse_prefixes(&prefixes)?;
        }
        if let Some(voice) = lookup("LARK_VOICE") {
            config.voice = voice;
        }
        if let Some(recorder) = lookup("LARK_RECORDER") {
            config.recorder = recorder;
        }
        if let Some(path) = lookup("LARK_AUDIO_FILE") {
            config.audio_file = PathBuf::from(path);
        }
        if let Some(threshold) = env.parse("LARK_PRESENCE_BYTES")? {
            config.presence_threshold = threshold;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, interval) in [
            ("LARK_POLL_INTERVAL_MS", self.poll_interval),
            ("LARK_IDLE_TIMEOUT_SECS", self.idle_timeout),
            ("LARK_REFRESH_INTERVAL_MS", self.refresh_interval),
        ] {
            if interval.is_zero() {
                bail!("{name} must be greater than zero");
            }
        }

        let timings = &self.timings;
        for (name, value) in [
            ("LARK_POLL_INTERVAL_MS", self.poll_interval),
            ("LARK_WAKE_CAPTURE_SECS", self.wake_capture),
            ("LARK_IDLE_TIMEOUT_SECS", self.idle_timeout),
            ("LARK_REFRESH_INTERVAL_MS", self.refresh_interval),
            ("LARK_LISTEN_SECS", timings.listen_window),
            ("LARK_THINK_MS", timings.think_time),
            ("LARK_LINE_HOLD_MS", timings.line_hold),
            ("LARK_ANNOUNCE_HOLD_MS", timings.announce_hold),
            ("LARK_DESCRIPTION_HOLD_MS", timings.description_hold),
        ] {
            if value > MAX_SETTING {
                bail!("{name} must be at most {}s", MAX_SETTING.as_secs());
            }
        }

        if self.statute_code.is_empty() {
            bail!("LARK_STATUTE must not be empty");
        }
        Ok(())
    }
}

/// Typed access to optional settings
struct Env<'a, F> {
    lookup: &'a F,
}

impl<F> Env<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.lookup)(key) {
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| anyhow::anyhow!("{e}"))
                .with_context(|| format!("invalid value for {key}: {raw:?}")),
            None => Ok(None),
        }
    }

    fn millis(&self, key: &str, slot: &mut Duration) -> Result<()> {
        if let Some(ms) = self.parse::<u64>(key)? {
            *slot = Duration::from_millis(ms);
        }
        Ok(())
    }

    fn secs(&self, key: &str, slot: &mut Duration) -> Result<()> {
        if let Some(secs) = self.parse::<u64>(key)? {
            *slot = Duration::from_secs(secs);
        }
        Ok(())
    }
}

fn parse_prefixes(raw: &str) -> Result<Vec<String>> {
    let prefixes: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            if p.ends_with(':') {
                p.to_string()
            } else {
                format!("{p}:")
            }
        })
        .collect();

    if prefixes.is_empty() {
        bail!("LARK_PREFIXES must name at least one prefix");
    }
    Ok(prefixes)
}
