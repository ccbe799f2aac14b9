use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Structural problems a descriptor or scenario can have beyond what serde
/// already rejects.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported schema_version '{0}'; supported versions: '1.0'")]
    SchemaVersion(String),
    #[error("limit 'max_cycles' must be greater than zero")]
    ZeroCycleLimit,
    #[error("run 'period_secs' must be greater than zero")]
    ZeroPeriod,
    #[error("board 'crystal_hz' must be greater than zero")]
    ZeroCrystal,
    #[error("peripheral entry {0} has an empty id")]
    EmptyPeripheralId(usize),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PeripheralConfig {
    pub id: String,
    pub r#type: String, // "uart", "timer", "intc", "clock"
    pub base_address: u32,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub irq: Option<u32>,
}

/// A board to simulate: the crystal and the register blocks on the bus.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BoardDescriptor {
    pub name: String,
    pub crystal_hz: u32,
    pub peripherals: Vec<PeripheralConfig>,
}

impl BoardDescriptor {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open board descriptor at {:?}", path.as_ref()))?;
        let desc: Self =
            serde_yaml::from_reader(f).context("Failed to parse board descriptor YAML")?;
        desc.validate()?;
        Ok(desc)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.crystal_hz == 0 {
            return Err(ConfigError::ZeroCrystal);
        }
        for (i, p) in self.peripherals.iter().enumerate() {
            if p.id.trim().is_empty() {
                return Err(ConfigError::EmptyPeripheralId(i));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioLimits {
    pub max_cycles: u64,
}

/// Knobs for the reference program inside a scenario.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioRun {
    /// Timer period in seconds.
    #[serde(default = "default_period")]
    pub period_secs: u32,
    /// Main-loop iterations before the program reports done. Absent means
    /// run until the cycle budget stops it.
    #[serde(default)]
    pub iterations: Option<u64>,
    #[serde(default = "default_seed")]
    pub seed: u32,
    /// Text scripted into the UART receiver before the program starts.
    #[serde(default)]
    pub input: Option<String>,
    /// Crystal cycles burned by the delay at the bottom of the loop.
    #[serde(default = "default_delay")]
    pub delay_cycles: u64,
}

fn default_period() -> u32 {
    2
}

fn default_seed() -> u32 {
    12345
}

fn default_delay() -> u64 {
    100_000
}

impl Default for ScenarioRun {
    fn default() -> Self {
        Self {
            period_secs: default_period(),
            iterations: None,
            seed: default_seed(),
            input: None,
            delay_cycles: default_delay(),
        }
    }
}

/// Why a simulated run ended.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    MaxCycles,
    MainDone,
    BusFault,
    IrqStorm,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::MaxCycles => "max_cycles",
            StopReason::MainDone => "main_done",
            StopReason::BusFault => "bus_fault",
            StopReason::IrqStorm => "irq_storm",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct UartContainsAssertion {
    pub uart_contains: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TickCountAssertion {
    pub tick_count: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StopReasonAssertion {
    pub expected_stop_reason: StopReason,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum ScenarioAssertion {
    UartContains(UartContainsAssertion),
    TickCount(TickCountAssertion),
    ExpectedStopReason(StopReasonAssertion),
}

/// A scripted run of the reference program with pass/fail assertions.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub schema_version: String,
    /// Board descriptor path, resolved relative to the scenario file.
    /// Absent means the built-in reference board.
    #[serde(default)]
    pub board: Option<String>,
    pub limits: ScenarioLimits,
    #[serde(default)]
    pub run: ScenarioRun,
    #[serde(default)]
    pub assertions: Vec<ScenarioAssertion>,
}

impl Scenario {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open scenario at {:?}", path.as_ref()))?;
        let scenario: Self =
            serde_yaml::from_reader(f).context("Failed to parse scenario YAML")?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schema_version != "1.0" {
            return Err(ConfigError::SchemaVersion(self.schema_version.clone()));
        }
        if self.limits.max_cycles == 0 {
            return Err(ConfigError::ZeroCycleLimit);
        }
        if self.run.period_secs == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        Ok(())
    }
}
