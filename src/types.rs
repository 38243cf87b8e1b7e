//! Common types and constants

use crate::error::EpidError;
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Application id sent by Windows clients
pub const APP_ID_WINDOWS: Uuid = Uuid::from_u128(0x55C92734_D682_4D71_983E_D6EC3F16059F);
/// Application id sent by Office 2010 clients
pub const APP_ID_OFFICE14: Uuid = Uuid::from_u128(0x59A52881_A989_479D_AF46_F275C6370663);
/// Application id sent by Office 2013 clients
pub const APP_ID_OFFICE15: Uuid = Uuid::from_u128(0x0FF1CE15_A989_479D_AF46_F275C6370663);

/// License channel: 00/01 retail, 02 OEM, 03 volume (GVLK, MAK)
pub const LICENSE_CHANNEL: u32 = 3;

/// LCID written into every ePID (en-US)
pub const LANGUAGE_CODE: u32 = 1033;

/// Office 2013 RTM
pub const OFFICE15_RELEASE: NaiveDate = ymd(2012, 10, 24);

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid calendar date in reference table"),
    }
}

/// Product family requesting activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplicationId {
    Windows,
    Office14,
    Office15,
}

impl ApplicationId {
    pub const ALL: [ApplicationId; 3] = [Self::Windows, Self::Office14, Self::Office15];

    pub const fn uuid(self) -> Uuid {
        match self {
            Self::Windows => APP_ID_WINDOWS,
            Self::Office14 => APP_ID_OFFICE14,
            Self::Office15 => APP_ID_OFFICE15,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Office14 => "office14",
            Self::Office15 => "office15",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::Office14 => "Office 2010",
            Self::Office15 => "Office 2013",
        }
    }

    /// Map a client-supplied application id onto a product family.
    ///
    /// Ids outside the known set are treated as Windows.
    pub fn from_uuid(id: Uuid) -> Self {
        if id == APP_ID_OFFICE14 {
            Self::Office14
        } else if id == APP_ID_OFFICE15 {
            Self::Office15
        } else {
            if id != APP_ID_WINDOWS {
                tracing::trace!(app_id = %id, "unrecognized application id, using Windows");
            }
            Self::Windows
        }
    }
}

impl From<Uuid> for ApplicationId {
    fn from(id: Uuid) -> Self {
        Self::from_uuid(id)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ApplicationId {
    type Err = EpidError;

    /// Accepts a family name (`windows`, `office14`, `office15`) or any GUID.
    fn from_str(s: &str) -> Result<Self, EpidError> {
        let s = s.trim();
        if let Some(app) = Self::ALL.iter().find(|app| app.name().eq_ignore_ascii_case(s)) {
            return Ok(*app);
        }

        let id = Uuid::parse_str(s.trim_matches(|c| c == '{' || c == '}')).map_err(|_| {
            EpidError::UnknownName {
                kind: "application",
                input: s.to_string(),
            }
        })?;
        Ok(Self::from_uuid(id))
    }
}

/// KMS host operating system release
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    Server2008R2Sp1,
    Server2012,
    Server2012R2,
}

impl HostOs {
    pub fn profile(self) -> &'static HostOsProfile {
        match self {
            Self::Server2008R2Sp1 => &HOST_SERVER2008R2,
            Self::Server2012 => &HOST_SERVER2012,
            Self::Server2012R2 => &HOST_SERVER2012R2,
        }
    }
}

impl FromStr for HostOs {
    type Err = EpidError;

    fn from_str(s: &str) -> Result<Self, EpidError> {
        HOST_OS_PROFILES
            .iter()
            .find(|profile| profile.short_name.eq_ignore_ascii_case(s.trim()))
            .map(|profile| profile.host)
            .ok_or_else(|| EpidError::UnknownName {
                kind: "host OS profile",
                input: s.to_string(),
            })
    }
}

/// KMS host OS identity written into the ePID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostOsProfile {
    pub host: HostOs,
    pub short_name: &'static str,
    pub description: &'static str,
    pub type_code: u32,
    pub os_build: u32,
    /// RTM date; no activation on this host can predate it
    pub release: NaiveDate,
}

pub const HOST_SERVER2008R2: HostOsProfile = HostOsProfile {
    host: HostOs::Server2008R2Sp1,
    short_name: "2008r2",
    description: "Windows Server 2008 R2 SP1",
    type_code: 55041,
    os_build: 7601,
    release: ymd(2011, 2, 16),
};

pub const HOST_SERVER2012: HostOsProfile = HostOsProfile {
    host: HostOs::Server2012,
    short_name: "2012",
    description: "Windows Server 2012",
    type_code: 5426,
    os_build: 9200,
    release: ymd(2012, 9, 4),
};

pub const HOST_SERVER2012R2: HostOsProfile = HostOsProfile {
    host: HostOs::Server2012R2,
    short_name: "2012r2",
    description: "Windows Server 2012 R2",
    type_code: 6401,
    os_build: 9600,
    release: ymd(2013, 10, 17),
};

/// Host profiles eligible for impersonation
pub const HOST_OS_PROFILES: &[HostOsProfile] =
    &[HOST_SERVER2008R2, HOST_SERVER2012, HOST_SERVER2012R2];

/// Product key numbering scheme for one product family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyConfig {
    pub name: &'static str,
    pub description: &'static str,
    pub group_id: u32,
    pub pid_range_min: u32,
    pub pid_range_max: u32,
}

impl KeyConfig {
    pub fn contains(&self, key_id: u32) -> bool {
        (self.pid_range_min..=self.pid_range_max).contains(&key_id)
    }
}

// The published ranges run further (Windows to 191999999, 2012 R2 to
// 310999999, Office 2010 to 217999999, Office 2013 to 255999999); only the
// lower part is used.
pub const KEY_CONFIG_WINDOWS: KeyConfig = KeyConfig {
    name: "windows",
    description: "Windows Server KMS host",
    group_id: 206,
    pid_range_min: 152_000_000,
    pid_range_max: 152_999_999,
};

pub const KEY_CONFIG_WINDOWS_2012R2: KeyConfig = KeyConfig {
    name: "windows2012r2",
    description: "Windows Server 2012 R2 KMS host",
    group_id: 206,
    pid_range_min: 271_000_000,
    pid_range_max: 271_999_999,
};

pub const KEY_CONFIG_OFFICE14: KeyConfig = KeyConfig {
    name: "office14",
    description: "Office 2010 KMS host",
    group_id: 96,
    pid_range_min: 199_000_000,
    pid_range_max: 201_999_999,
};

pub const KEY_CONFIG_OFFICE15: KeyConfig = KeyConfig {
    name: "office15",
    description: "Office 2013 KMS host",
    group_id: 206,
    pid_range_min: 234_000_000,
    pid_range_max: 234_999_999,
};

pub const KEY_CONFIGS: &[KeyConfig] = &[
    KEY_CONFIG_WINDOWS,
    KEY_CONFIG_WINDOWS_2012R2,
    KEY_CONFIG_OFFICE14,
    KEY_CONFIG_OFFICE15,
];
