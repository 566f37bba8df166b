// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

//======================================================================================================================
// Imports
//======================================================================================================================

use crate::{
    disciplines::{
        FrameSizeParams,
        IntegrityParams,
        JitterParams,
        RttParams,
        ThroughputParams,
    },
    protocols::layer2::EtherType2,
    runtime::{
        fail::Fail,
        network::{
            consts::DEFAULT_PROBE_TIMEOUT,
            types::MacAddress,
        },
    },
    session::PayloadGenerator,
};
use ::std::{
    fs,
    ops::Index,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};
use ::yaml_rust::{
    yaml::Hash,
    Yaml,
    YamlLoader,
};

//======================================================================================================================
// Constants
//======================================================================================================================

// Options shared by both programs. Every one of them can be overridden with an environment variable.
mod global_config {
    pub const SECTION_NAME: &str = "l2probe";
    // Local network interface name.
    pub const INTERFACE_NAME: &str = "interface_name";
    // Link address of the echo server.
    pub const PEER_LINK_ADDR: &str = "peer_link_addr";
    pub const ETHER_TYPE: &str = "ether_type";
    pub const VLAN_ID: &str = "vlan_id";
    pub const PROBE_TIMEOUT_MS: &str = "probe_timeout_ms";
    // Fixed probe payload. Random bytes are used if absent.
    pub const PAYLOAD: &str = "payload";
    // Directory for result files.
    pub const OUTPUT_DIR: &str = "output_dir";
}

// Measurement parameters, one subsection per discipline.
mod disciplines_config {
    pub const SECTION_NAME: &str = "disciplines";
    pub const RTT: &str = "rtt";
    pub const THROUGHPUT: &str = "throughput";
    pub const JITTER: &str = "jitter";
    pub const INTEGRITY: &str = "integrity";
    pub const FRAME_SIZE: &str = "frame_size";
    pub const COUNT: &str = "count";
    pub const INTERVAL_MS: &str = "interval_ms";
    pub const DURATION_MS: &str = "duration_ms";
    pub const PAYLOAD_SIZE: &str = "payload_size";
    pub const SIZES: &str = "sizes";
}

//======================================================================================================================
// Structures
//======================================================================================================================

/// Probe configuration. Missing sections and options fall back to built-in defaults.
#[derive(Clone, Debug)]
pub struct Config(pub Yaml);

//======================================================================================================================
// Associated Functions
//======================================================================================================================

impl Config {
    /// Reads a configuration file into a [Config] object.
    pub fn new(config_path: &str) -> Result<Self, Fail> {
        let config_s: String = match fs::read_to_string(config_path) {
            Ok(config_s) => config_s,
            Err(e) => {
                let cause: String = format!("failed to read {}: {}", config_path, e);
                error!("new(): {}", cause);
                return Err(Fail::new(e.raw_os_error().unwrap_or(libc::EINVAL), &cause));
            },
        };
        Self::parse(&config_s)
    }

    /// Parses a YAML document. An empty document yields the default configuration.
    pub fn parse(config_s: &str) -> Result<Self, Fail> {
        let config: Vec<Yaml> = match YamlLoader::load_from_str(config_s) {
            Ok(config) => config,
            Err(e) => {
                let cause: String = format!("malformed configuration: {}", e);
                return Err(Fail::new(libc::EINVAL, &cause));
            },
        };
        match &config[..] {
            [] => Ok(Self::default()),
            [config_obj @ Yaml::Hash(_)] => Ok(Self(config_obj.clone())),
            [_] => Err(Fail::new(libc::EINVAL, "configuration must be a mapping")),
            _ => Err(Fail::new(libc::EINVAL, "Wrong number of config objects")),
        }
    }

    fn get_global_config(&self) -> Result<Option<&Yaml>, Fail> {
        Self::find_subsection(&self.0, global_config::SECTION_NAME)
    }

    fn get_discipline_config(&self, name: &str) -> Result<Option<&Yaml>, Fail> {
        match Self::find_subsection(&self.0, disciplines_config::SECTION_NAME)? {
            Some(section) => Self::find_subsection(section, name),
            None => Ok(None),
        }
    }

    /// Reads the interface name from the environment variable first and then the configuration file.
    pub fn interface_name(&self) -> Result<Option<String>, Fail> {
        if let Some(name) = Self::get_typed_env_option(global_config::INTERFACE_NAME)? {
            return Ok(Some(name));
        }
        match self.get_global_config()? {
            Some(section) => Self::find_typed_option(section, global_config::INTERFACE_NAME, |val: &Yaml| {
                val.as_str().map(str::to_string)
            }),
            None => Ok(None),
        }
    }

    /// Reads the link address of the echo server from the environment variable first and then the configuration file.
    pub fn peer_link_addr(&self) -> Result<Option<MacAddress>, Fail> {
        if let Some(addr) = Self::get_typed_env_option(global_config::PEER_LINK_ADDR)? {
            return Ok(Some(addr));
        }
        match self.get_global_config()? {
            Some(section) => Self::find_typed_option(section, global_config::PEER_LINK_ADDR, |val: &Yaml| {
                val.as_str().and_then(|val: &str| MacAddress::parse_canonical_str(val).ok())
            }),
            None => Ok(None),
        }
    }

    /// Reads the EtherType. The file may carry it as an integer or as a hexadecimal string.
    pub fn ether_type(&self) -> Result<EtherType2, Fail> {
        if let Some(ether_type) = Self::get_typed_env_option(global_config::ETHER_TYPE)? {
            return Ok(ether_type);
        }
        let section: &Yaml = match self.get_global_config()? {
            Some(section) => section,
            None => return Ok(EtherType2::default()),
        };
        let ether_type: Option<EtherType2> =
            Self::find_typed_option(section, global_config::ETHER_TYPE, |val: &Yaml| match val {
                Yaml::Integer(val) => u16::try_from(*val).ok().map(EtherType2::new),
                Yaml::String(val) => val.parse().ok(),
                _ => None,
            })?;
        Ok(ether_type.unwrap_or_default())
    }

    /// Reads the VLAN id. `None` means untagged operation.
    pub fn vlan_id(&self) -> Result<Option<u16>, Fail> {
        if let Some(vlan_id) = Self::get_typed_env_option(global_config::VLAN_ID)? {
            return Ok(Some(vlan_id));
        }
        match self.get_global_config()? {
            Some(section) => Self::find_int_option(section, global_config::VLAN_ID),
            None => Ok(None),
        }
    }

    /// Reads the per-probe timeout budget.
    pub fn probe_timeout(&self) -> Result<Duration, Fail> {
        if let Some(timeout_ms) = Self::get_typed_env_option::<u64>(global_config::PROBE_TIMEOUT_MS)? {
            return Ok(Duration::from_millis(timeout_ms));
        }
        let timeout_ms: Option<u64> = match self.get_global_config()? {
            Some(section) => Self::find_int_option(section, global_config::PROBE_TIMEOUT_MS)?,
            None => None,
        };
        Ok(timeout_ms.map(Duration::from_millis).unwrap_or(DEFAULT_PROBE_TIMEOUT))
    }

    /// Reads the probe payload. A configured string is sent as is, otherwise payloads are random.
    pub fn payload(&self) -> Result<PayloadGenerator, Fail> {
        let payload: Option<String> = match Self::get_typed_env_option(global_config::PAYLOAD)? {
            Some(payload) => Some(payload),
            None => match self.get_global_config()? {
                Some(section) => Self::find_typed_option(section, global_config::PAYLOAD, |val: &Yaml| {
                    val.as_str().map(str::to_string)
                })?,
                None => None,
            },
        };
        Ok(match payload {
            Some(payload) => PayloadGenerator::Fixed(payload.into_bytes()),
            None => PayloadGenerator::Random,
        })
    }

    /// Reads the directory where result files are written. Defaults to the working directory.
    pub fn output_dir(&self) -> Result<PathBuf, Fail> {
        if let Some(dir) = Self::get_typed_env_option::<String>(global_config::OUTPUT_DIR)? {
            return Ok(PathBuf::from(dir));
        }
        let dir: Option<String> = match self.get_global_config()? {
            Some(section) => Self::find_typed_option(section, global_config::OUTPUT_DIR, |val: &Yaml| {
                val.as_str().map(str::to_string)
            })?,
            None => None,
        };
        Ok(PathBuf::from(dir.unwrap_or_else(|| ".".to_string())))
    }

    pub fn rtt_params(&self) -> Result<RttParams, Fail> {
        let mut params: RttParams = RttParams::default();
        if let Some(section) = self.get_discipline_config(disciplines_config::RTT)? {
            Self::override_int(section, disciplines_config::COUNT, &mut params.count)?;
            Self::override_millis(section, disciplines_config::INTERVAL_MS, &mut params.interval)?;
            Self::override_int(section, disciplines_config::PAYLOAD_SIZE, &mut params.payload_size)?;
        }
        Ok(params)
    }

    pub fn throughput_params(&self) -> Result<ThroughputParams, Fail> {
        let mut params: ThroughputParams = ThroughputParams::default();
        if let Some(section) = self.get_discipline_config(disciplines_config::THROUGHPUT)? {
            Self::override_millis(section, disciplines_config::DURATION_MS, &mut params.duration)?;
            Self::override_int(section, disciplines_config::PAYLOAD_SIZE, &mut params.payload_size)?;
        }
        Ok(params)
    }

    pub fn jitter_params(&self) -> Result<JitterParams, Fail> {
        let mut params: JitterParams = JitterParams::default();
        if let Some(section) = self.get_discipline_config(disciplines_config::JITTER)? {
            Self::override_int(section, disciplines_config::COUNT, &mut params.count)?;
            Self::override_millis(section, disciplines_config::INTERVAL_MS, &mut params.interval)?;
            Self::override_int(section, disciplines_config::PAYLOAD_SIZE, &mut params.payload_size)?;
        }
        Ok(params)
    }

    pub fn integrity_params(&self) -> Result<IntegrityParams, Fail> {
        let mut params: IntegrityParams = IntegrityParams::default();
        if let Some(section) = self.get_discipline_config(disciplines_config::INTEGRITY)? {
            Self::override_int(section, disciplines_config::COUNT, &mut params.count)?;
            Self::override_int(section, disciplines_config::PAYLOAD_SIZE, &mut params.payload_size)?;
        }
        Ok(params)
    }

    pub fn frame_size_params(&self) -> Result<FrameSizeParams, Fail> {
        let mut params: FrameSizeParams = FrameSizeParams::default();
        if let Some(section) = self.get_discipline_config(disciplines_config::FRAME_SIZE)? {
            let sizes: Option<&Vec<Yaml>> = Self::find_typed_option(section, disciplines_config::SIZES, &Yaml::as_vec)?;
            if let Some(sizes) = sizes {
                params.sizes = sizes
                    .iter()
                    .map(|size: &Yaml| Self::int_value(size, disciplines_config::SIZES))
                    .collect::<Result<Vec<usize>, Fail>>()?;
            }
        }
        Ok(params)
    }

    fn override_int<T: TryFrom<i64>>(yaml: &Yaml, index: &str, value: &mut T) -> Result<(), Fail> {
        if let Some(configured) = Self::find_int_option(yaml, index)? {
            *value = configured;
        }
        Ok(())
    }

    fn override_millis(yaml: &Yaml, index: &str, value: &mut Duration) -> Result<(), Fail> {
        if let Some(millis) = Self::find_int_option::<u64>(yaml, index)? {
            *value = Duration::from_millis(millis);
        }
        Ok(())
    }

    /// Index `yaml` to find the subsection at `index`, if there is one.
    fn find_subsection<'a>(yaml: &'a Yaml, index: &str) -> Result<Option<&'a Yaml>, Fail> {
        match Self::find_option(yaml, index) {
            None => Ok(None),
            Some(section @ Yaml::Hash(_)) => Ok(Some(section)),
            Some(_) => {
                let message: String = format!("parameter \"{}\" has unexpected type", index);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
        }
    }

    /// Index `yaml` to find the value at `index`. Absent and null values are both reported as `None`.
    fn find_option<'a>(yaml: &'a Yaml, index: &str) -> Option<&'a Yaml> {
        match yaml.index(index) {
            Yaml::BadValue | Yaml::Null => None,
            value => Some(value),
        }
    }

    /// Index `yaml` to find the value at `index`, validating that the receiver returns Some(_) if the value exists.
    fn find_typed_option<'a, T, Fn>(yaml: &'a Yaml, index: &str, receiver: Fn) -> Result<Option<T>, Fail>
    where
        Fn: FnOnce(&'a Yaml) -> Option<T>,
    {
        let option: &'a Yaml = match Self::find_option(yaml, index) {
            Some(option) => option,
            None => return Ok(None),
        };
        match receiver(option) {
            Some(value) => Ok(Some(value)),
            None => {
                let message: String = format!("parameter {} has unexpected type", index);
                Err(Fail::new(libc::EINVAL, message.as_str()))
            },
        }
    }

    /// Get value where the environment value overrides the config file if it exists.
    fn get_typed_env_option<T: FromStr>(index: &str) -> Result<Option<T>, Fail> {
        // Check for the environment variable.
        if let Ok(var) = ::std::env::var(index.to_uppercase()) {
            if let Ok(value) = var.as_str().parse() {
                return Ok(Some(value));
            } else {
                let message: String = format!("parameter {} has unexpected type", index);
                return Err(Fail::new(libc::EINVAL, message.as_str()));
            }
        }
        Ok(None)
    }

    /// Same as [Self::find_typed_option] using `Yaml::as_i64` as the receiver, but additionally verifies that the
    /// destination type may hold the value.
    fn find_int_option<T: TryFrom<i64>>(yaml: &Yaml, index: &str) -> Result<Option<T>, Fail> {
        match Self::find_option(yaml, index) {
            Some(option) => Ok(Some(Self::int_value(option, index)?)),
            None => Ok(None),
        }
    }

    fn int_value<T: TryFrom<i64>>(option: &Yaml, index: &str) -> Result<T, Fail> {
        let val: i64 = match option.as_i64() {
            Some(val) => val,
            None => {
                let message: String = format!("parameter {} has unexpected type", index);
                return Err(Fail::new(libc::EINVAL, message.as_str()));
            },
        };
        match T::try_from(val) {
            Ok(val) => Ok(val),
            _ => {
                let message: String = format!("parameter \"{}\" is out of range", index);
                Err(Fail::new(libc::ERANGE, message.as_str()))
            },
        }
    }
}

//======================================================================================================================
// Trait Implementations
//======================================================================================================================

impl Default for Config {
    fn default() -> Self {
        Self(Yaml::Hash(Hash::new()))
    }
}

//======================================================================================================================
// Unit Tests
//======================================================================================================================
