//! Device and web-service encode preset tables.
//!
//! Both tables resolve unrecognized names to the explicit [`Generic`]
//! variant (1280x720 at 2 Mbps) rather than an implicit fallback, so the
//! default is testable in isolation.
//!
//! [`Generic`]: DevicePreset::Generic

/// Scale and bitrate applied by a preset encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeSettings {
    pub width: u32,
    pub height: u32,
    pub video_bitrate: &'static str,
}

/// The settings every unrecognized preset name resolves to.
pub const GENERIC_SETTINGS: EncodeSettings = EncodeSettings {
    width: 1280,
    height: 720,
    video_bitrate: "2M",
};

/// Named device encode preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DevicePreset {
    Iphone,
    Ipad,
    Android,
    Tv,
    /// Explicit default for unrecognized device names.
    Generic,
}

impl DevicePreset {
    /// All presets, generic last.
    pub const ALL: &'static [DevicePreset] = &[
        DevicePreset::Iphone,
        DevicePreset::Ipad,
        DevicePreset::Android,
        DevicePreset::Tv,
        DevicePreset::Generic,
    ];

    /// Resolve a device name; unknown names yield [`DevicePreset::Generic`].
    pub fn resolve(name: &str) -> DevicePreset {
        match name.trim().to_ascii_lowercase().as_str() {
            "iphone" => DevicePreset::Iphone,
            "ipad" => DevicePreset::Ipad,
            "android" => DevicePreset::Android,
            "tv" => DevicePreset::Tv,
            _ => DevicePreset::Generic,
        }
    }

    /// Wire name of this preset.
    pub fn name(&self) -> &'static str {
        match self {
            DevicePreset::Iphone => "iphone",
            DevicePreset::Ipad => "ipad",
            DevicePreset::Android => "android",
            DevicePreset::Tv => "tv",
            DevicePreset::Generic => "generic",
        }
    }

    /// Scale and bitrate for this preset.
    pub fn settings(&self) -> EncodeSettings {
        match self {
            DevicePreset::Iphone => EncodeSettings {
                width: 1920,
                height: 1080,
                video_bitrate: "4M",
            },
            DevicePreset::Ipad => EncodeSettings {
                width: 1920,
                height: 1080,
                video_bitrate: "4M",
            },
            DevicePreset::Android => EncodeSettings {
                width: 1280,
                height: 720,
                video_bitrate: "2500k",
            },
            DevicePreset::Tv => EncodeSettings {
                width: 3840,
                height: 2160,
                video_bitrate: "10M",
            },
            DevicePreset::Generic => GENERIC_SETTINGS,
        }
    }

    /// Wire names of all presets.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.name()).collect()
    }
}

/// Named web-service encode preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServicePreset {
    Youtube,
    Instagram,
    Tiktok,
    Twitter,
    Whatsapp,
    /// Explicit default for unrecognized platform names.
    Generic,
}

impl ServicePreset {
    /// All presets, generic last.
    pub const ALL: &'static [ServicePreset] = &[
        ServicePreset::Youtube,
        ServicePreset::Instagram,
        ServicePreset::Tiktok,
        ServicePreset::Twitter,
        ServicePreset::Whatsapp,
        ServicePreset::Generic,
    ];

    /// Resolve a platform name; unknown names yield [`ServicePreset::Generic`].
    pub fn resolve(name: &str) -> ServicePreset {
        match name.trim().to_ascii_lowercase().as_str() {
            "youtube" => ServicePreset::Youtube,
            "instagram" => ServicePreset::Instagram,
            "tiktok" => ServicePreset::Tiktok,
            "twitter" | "x" => ServicePreset::Twitter,
            "whatsapp" => ServicePreset::Whatsapp,
            _ => ServicePreset::Generic,
        }
    }

    /// Wire name of this preset.
    pub fn name(&self) -> &'static str {
        match self {
            ServicePreset::Youtube => "youtube",
            ServicePreset::Instagram => "instagram",
            ServicePreset::Tiktok => "tiktok",
            ServicePreset::Twitter => "twitter",
            ServicePreset::Whatsapp => "whatsapp",
            ServicePreset::Generic => "generic",
        }
    }

    /// Scale and bitrate for this preset.
    pub fn settings(&self) -> EncodeSettings {
        match self {
            ServicePreset::Youtube => EncodeSettings {
                width: 1920,
                height: 1080,
                video_bitrate: "6M",
            },
            ServicePreset::Instagram => EncodeSettings {
                width: 1080,
                height: 1080,
                video_bitrate: "3500k",
            },
            ServicePreset::Tiktok => EncodeSettings {
                width: 1080,
                height: 1920,
                video_bitrate: "4M",
            },
            ServicePreset::Twitter => EncodeSettings {
                width: 1280,
                height: 720,
                video_bitrate: "2M",
            },
            ServicePreset::Whatsapp => EncodeSettings {
                width: 848,
                height: 480,
                video_bitrate: "1M",
            },
            ServicePreset::Generic => GENERIC_SETTINGS,
        }
    }

    /// Wire names of all presets.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|p| p.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_device_names_resolve() {
        assert_eq!(DevicePreset::resolve("iphone"), DevicePreset::Iphone);
        assert_eq!(DevicePreset::resolve("IPAD"), DevicePreset::Ipad);
        assert_eq!(DevicePreset::resolve(" tv "), DevicePreset::Tv);
    }

    #[test]
    fn unknown_device_name_resolves_to_generic() {
        let preset = DevicePreset::resolve("some-future-handset");
        assert_eq!(preset, DevicePreset::Generic);
        let settings = preset.settings();
        assert_eq!(settings.width, 1280);
        assert_eq!(settings.height, 720);
        assert_eq!(settings.video_bitrate, "2M");
    }

    #[test]
    fn unknown_service_name_resolves_to_generic() {
        assert_eq!(ServicePreset::resolve("myspace"), ServicePreset::Generic);
        assert_eq!(ServicePreset::resolve("myspace").settings(), GENERIC_SETTINGS);
    }

    #[test]
    fn twitter_alias() {
        assert_eq!(ServicePreset::resolve("x"), ServicePreset::Twitter);
    }

    #[test]
    fn round_trip_names() {
        for preset in DevicePreset::ALL {
            assert_eq!(DevicePreset::resolve(preset.name()), *preset);
        }
        for preset in ServicePreset::ALL {
            assert_eq!(ServicePreset::resolve(preset.name()), *preset);
        }
    }
}
