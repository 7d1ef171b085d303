//! Binary variants that can be resolved into deployments.

use std::fmt;
use std::str::FromStr;

/// Identifies which product build is requested.
///
/// The [`Display`](fmt::Display) form is the name used by the
/// client-settings API (e.g. `WindowsStudio64`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryVariant {
    WindowsPlayer,
    WindowsStudio64,
    MacPlayer,
    MacStudio,
}

impl BinaryVariant {
    /// All known variants.
    pub const ALL: [BinaryVariant; 4] = [
        BinaryVariant::WindowsPlayer,
        BinaryVariant::WindowsStudio64,
        BinaryVariant::MacPlayer,
        BinaryVariant::MacStudio,
    ];

    /// Name of the variant as understood by the client-settings API.
    pub fn api_name(self) -> &'static str {
        match self {
            BinaryVariant::WindowsPlayer => "WindowsPlayer",
            BinaryVariant::WindowsStudio64 => "WindowsStudio64",
            BinaryVariant::MacPlayer => "MacPlayer",
            BinaryVariant::MacStudio => "MacStudio",
        }
    }

    /// Short product name, `Player` or `Studio`.
    pub fn short(self) -> &'static str {
        match self {
            BinaryVariant::WindowsPlayer | BinaryVariant::MacPlayer => "Player",
            BinaryVariant::WindowsStudio64 | BinaryVariant::MacStudio => "Studio",
        }
    }

    /// File name of the installer executable for this variant.
    ///
    /// # Example
    ///
    /// ```
    /// use rbxbin::BinaryVariant;
    ///
    /// assert_eq!(
    ///     BinaryVariant::WindowsStudio64.installer_name(),
    ///     "RobloxStudioInstaller.exe"
    /// );
    /// ```
    pub fn installer_name(self) -> String {
        format!("Roblox{}Installer.exe", self.short())
    }
}

impl fmt::Display for BinaryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}

impl FromStr for BinaryVariant {
    type Err = String;

    /// Accepts API names (case-insensitive) and the short CLI aliases
    /// `player`, `studio`, `mac-player` and `mac-studio`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "windowsplayer" | "windows-player" | "player" => Ok(BinaryVariant::WindowsPlayer),
            "windowsstudio64" | "windows-studio" | "windowsstudio" | "studio" => {
                Ok(BinaryVariant::WindowsStudio64)
            }
            "macplayer" | "mac-player" => Ok(BinaryVariant::MacPlayer),
            "macstudio" | "mac-studio" => Ok(BinaryVariant::MacStudio),
            other => Err(format!("unknown binary variant: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_names() {
        assert_eq!(BinaryVariant::WindowsPlayer.short(), "Player");
        assert_eq!(BinaryVariant::MacPlayer.short(), "Player");
        assert_eq!(BinaryVariant::WindowsStudio64.short(), "Studio");
        assert_eq!(BinaryVariant::MacStudio.short(), "Studio");
    }

    #[test]
    fn test_installer_name() {
        assert_eq!(
            BinaryVariant::WindowsPlayer.installer_name(),
            "RobloxPlayerInstaller.exe"
        );
    }

    #[test]
    fn test_parse_roundtrips_display() {
        for variant in BinaryVariant::ALL {
            assert_eq!(variant.to_string().parse::<BinaryVariant>(), Ok(variant));
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("player".parse(), Ok(BinaryVariant::WindowsPlayer));
        assert_eq!("Studio".parse(), Ok(BinaryVariant::WindowsStudio64));
        assert_eq!("mac-studio".parse(), Ok(BinaryVariant::MacStudio));
        assert!("linux".parse::<BinaryVariant>().is_err());
    }
}
