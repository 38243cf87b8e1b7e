//! ePID generation module

pub mod date;
pub mod format;
pub mod validation;

pub use date::{activation_floor, day_of_year, random_activation_date};
pub use validation::{validate_clock, validate_tables};

use crate::clock::{Clock, SystemClock};
use crate::error::EpidError;
use crate::types::{
    ApplicationId, HostOs, HostOsProfile, KeyConfig, HOST_OS_PROFILES, KEY_CONFIG_OFFICE14,
    KEY_CONFIG_OFFICE15, KEY_CONFIG_WINDOWS, KEY_CONFIG_WINDOWS_2012R2, LANGUAGE_CODE,
    LICENSE_CHANNEL,
};
use chrono::{Datelike, NaiveDate};
use rand::Rng;
use tracing::{debug, info};

/// Decoded Extended Product ID.
///
/// `Display` renders the wire form, `FromStr` reads it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Epid {
    pub host_type: u32,
    pub group_id: u32,
    /// Product key id, split into a 3 digit and a 6 digit field on output
    pub key_id: u32,
    pub license_channel: u32,
    pub language: u32,
    pub os_build: u32,
    pub activation_date: NaiveDate,
}

impl Epid {
    pub fn key_major(&self) -> u32 {
        self.key_id / 1_000_000
    }

    pub fn key_minor(&self) -> u32 {
        self.key_id % 1_000_000
    }

    pub fn day_of_year(&self) -> u32 {
        day_of_year(self.activation_date)
    }

    pub fn year(&self) -> i32 {
        self.activation_date.year()
    }
}

/// Key numbering scheme for a request.
///
/// Office families have their own configs. Everything else is Windows,
/// refined to the 2012 R2 range when the host reports build 9600.
pub fn select_key_config(app: ApplicationId, host: &HostOsProfile) -> &'static KeyConfig {
    match app {
        ApplicationId::Office14 => &KEY_CONFIG_OFFICE14,
        ApplicationId::Office15 => &KEY_CONFIG_OFFICE15,
        _ if host.os_build == 9600 => &KEY_CONFIG_WINDOWS_2012R2,
        _ => &KEY_CONFIG_WINDOWS,
    }
}

/// Builds ePIDs against the built-in reference tables.
///
/// The generator holds no mutable state; randomness is passed into each
/// call, so one instance can be shared between request handlers that each
/// bring their own RNG.
#[derive(Debug, Clone)]
pub struct EpidGenerator<C = SystemClock> {
    clock: C,
}

impl EpidGenerator<SystemClock> {
    /// Generator reading the UTC system clock.
    pub fn system() -> Result<Self, EpidError> {
        Self::new(SystemClock)
    }
}

impl<C: Clock> EpidGenerator<C> {
    /// Validate the reference tables and the clock, then build the generator.
    ///
    /// Fails if a table entry would overflow its ePID field or the clock reads
    /// earlier than the newest activation floor.
    pub fn new(clock: C) -> Result<Self, EpidError> {
        validate_tables()?;
        validate_clock(&clock)?;
        info!(
            hosts = HOST_OS_PROFILES.len(),
            now = %clock.now(),
            "ePID generator ready"
        );
        Ok(Self { clock })
    }

    /// Generate an ePID on a uniformly chosen host profile.
    ///
    /// Only fails with [`EpidError::FloorAfterNow`] if the clock has moved
    /// back past the newest activation floor since construction.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        app: ApplicationId,
        protocol: u32,
    ) -> Result<Epid, EpidError> {
        let host = &HOST_OS_PROFILES[rng.gen_range(0..HOST_OS_PROFILES.len())];
        self.generate_for_host(rng, app, protocol, host.host)
    }

    /// Generate an ePID impersonating a specific host OS.
    pub fn generate_for_host<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        app: ApplicationId,
        protocol: u32,
        host: HostOs,
    ) -> Result<Epid, EpidError> {
        let profile = host.profile();
        let key_config = select_key_config(app, profile);
        let key_id = rng.gen_range(key_config.pid_range_min..=key_config.pid_range_max);

        let floor = activation_floor(app, protocol, profile);
        let activation_date = random_activation_date(rng, floor, self.clock.now())?;

        let epid = Epid {
            host_type: profile.type_code,
            group_id: key_config.group_id,
            key_id,
            license_channel: LICENSE_CHANNEL,
            language: LANGUAGE_CODE,
            os_build: profile.os_build,
            activation_date,
        };

        debug!(
            %app,
            protocol,
            host = profile.description,
            key_config = key_config.name,
            %floor,
            %epid,
            "generated ePID"
        );
        Ok(epid)
    }
}
