//! Video hosting platforms known to the front-ends.

/// Platforms with a dedicated presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownPlatform {
    YouTube,
    TikTok,
    Twitter,
    Facebook,
    Instagram,
}

/// Platform of a video as reported by the server. Keys the client does not know map to
/// `Unknown`, which renders with [`DEFAULT_DESCRIPTOR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Known(KnownPlatform),
    Unknown,
}

/// How a platform is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub name: &'static str,
    /// Font Awesome icon classes
    pub icon: &'static str,
    /// Brand color as a CSS color
    pub color: &'static str,
}

pub const DEFAULT_DESCRIPTOR: PlatformDescriptor = PlatformDescriptor {
    name: "Video",
    icon: "fas fa-video",
    color: "#667eea",
};

impl KnownPlatform {
    pub const ALL: [Self; 5] = [
        Self::YouTube,
        Self::TikTok,
        Self::Twitter,
        Self::Facebook,
        Self::Instagram,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::YouTube => "youtube",
            Self::TikTok => "tiktok",
            Self::Twitter => "twitter",
            Self::Facebook => "facebook",
            Self::Instagram => "instagram",
        }
    }

    pub fn descriptor(self) -> PlatformDescriptor {
        match self {
            Self::YouTube => PlatformDescriptor {
                name: "YouTube",
                icon: "fab fa-youtube",
                color: "#FF0000",
            },
            Self::TikTok => PlatformDescriptor {
                name: "TikTok",
                icon: "fab fa-tiktok",
                color: "#000000",
            },
            Self::Twitter => PlatformDescriptor {
                name: "Twitter",
                icon: "fab fa-twitter",
                color: "#1DA1F2",
            },
            Self::Facebook => PlatformDescriptor {
                name: "Facebook",
                icon: "fab fa-facebook",
                color: "#1877F2",
            },
            Self::Instagram => PlatformDescriptor {
                name: "Instagram",
                icon: "fab fa-instagram",
                color: "#E4405F",
            },
        }
    }
}

impl Platform {
    pub fn from_key(key: &str) -> Self {
        KnownPlatform::ALL
            .into_iter()
            .find(|p| p.key().eq_ignore_ascii_case(key.trim()))
            .map_or(Self::Unknown, Self::Known)
    }

    pub fn descriptor(self) -> PlatformDescriptor {
        match self {
            Self::Known(platform) => platform.descriptor(),
            Self::Unknown => DEFAULT_DESCRIPTOR,
        }
    }
}

/// Guesses the platform of a partially typed URL to style the input box. Only URLs longer than
/// ten characters are classified.
pub fn url_hint(url: &str) -> Option<KnownPlatform> {
    let url = url.trim();
    if url.len() <= 10 {
        return None;
    }

    let url = url.to_ascii_lowercase();
    if url.contains("tiktok.com") {
        Some(KnownPlatform::TikTok)
    } else if url.contains("youtube.com") || url.contains("youtu.be") {
        Some(KnownPlatform::YouTube)
    } else if url.contains("instagram.com") {
        Some(KnownPlatform::Instagram)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[googletest::test]
    fn keys_map_to_closed_variants() {
        expect_that!(
            Platform::from_key("tiktok"),
            eq(Platform::Known(KnownPlatform::TikTok))
        );
        expect_that!(
            Platform::from_key("YouTube"),
            eq(Platform::Known(KnownPlatform::YouTube))
        );
        expect_that!(Platform::from_key("vimeo"), eq(Platform::Unknown));
        expect_that!(Platform::from_key(""), eq(Platform::Unknown));
    }

    #[googletest::test]
    fn unknown_platform_uses_default_descriptor() {
        expect_that!(Platform::Unknown.descriptor(), eq(DEFAULT_DESCRIPTOR));
        expect_that!(
            Platform::Known(KnownPlatform::Instagram).descriptor().name,
            eq("Instagram")
        );
    }

    #[googletest::test]
    fn hints_only_long_urls() {
        expect_that!(url_hint("youtu.be/x"), none());
        expect_that!(
            url_hint("https://vm.tiktok.com/ZMabc/"),
            some(eq(KnownPlatform::TikTok))
        );
        expect_that!(
            url_hint("https://youtu.be/dQw4w9WgXcQ"),
            some(eq(KnownPlatform::YouTube))
        );
        expect_that!(url_hint("https://vimeo.com/12345"), none());
    }
}
