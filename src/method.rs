//! Wire names of the reward ad methods and the ad type tag.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A reward ad method, named as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Init,
    Load,
    Show,
    GetReward,
    IsAdLoaded,
    Pause,
    Resume,
    Destroy,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Init,
        Method::Load,
        Method::Show,
        Method::GetReward,
        Method::IsAdLoaded,
        Method::Pause,
        Method::Resume,
        Method::Destroy,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Method::Init => "initRewardAd",
            Method::Load => "loadRewardAd",
            Method::Show => "showRewardAd",
            Method::GetReward => "getRewardAdReward",
            Method::IsAdLoaded => "isAdLoaded",
            Method::Pause => "pauseAd",
            Method::Resume => "resumeAd",
            Method::Destroy => "destroyAd",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// Ad format discriminator sent as `adType` by callers that share
/// `isAdLoaded`/`pauseAd`/`resumeAd`/`destroyAd` across ad formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdType {
    Banner,
    Interstitial,
    Native,
    Reward,
    Splash,
    Instream,
}

impl AdType {
    pub fn tag(&self) -> &'static str {
        match self {
            AdType::Banner => "Banner",
            AdType::Interstitial => "Interstitial",
            AdType::Native => "Native",
            AdType::Reward => "Reward",
            AdType::Splash => "Splash",
            AdType::Instream => "Instream",
        }
    }
}

impl FromStr for AdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Banner" => Ok(AdType::Banner),
            "Interstitial" => Ok(AdType::Interstitial),
            "Native" => Ok(AdType::Native),
            "Reward" => Ok(AdType::Reward),
            "Splash" => Ok(AdType::Splash),
            "Instream" => Ok(AdType::Instream),
            other => Err(format!("unknown ad type '{}'", other)),
        }
    }
}
