/// Capabilities report - colored console summary of a GL context
///
/// Printed on demand (typically once at startup) so texture format decisions
/// made later are easy to explain.

use colored::*;
use lime_engine::lime::device::{Capabilities, FormatSupport};

/// Texture features in report order
const FEATURES: [(&str, FormatSupport); 5] = [
    ("S3TC (DXT1/3/5)", FormatSupport::S3TC),
    ("ETC1", FormatSupport::ETC1),
    ("ETC2 / EAC", FormatSupport::ETC2),
    ("PVRTC", FormatSupport::PVRTC),
    ("Non-power-of-two", FormatSupport::NPOT),
];

/// Each texture feature with whether the context provides it
pub fn feature_support(capabilities: &Capabilities) -> Vec<(&'static str, bool)> {
    FEATURES
        .iter()
        .map(|&(name, flag)| (name, capabilities.formats().contains(flag)))
        .collect()
}

/// Print the capabilities report
pub fn print_capabilities_report(capabilities: &Capabilities) {
    let version = capabilities.version();
    let api = if version.embedded { "OpenGL ES" } else { "OpenGL" };

    println!("\n{}", "=== OpenGL Capabilities Report ===".bright_blue().bold());
    println!("  {} {} {}.{}", "API:".white().bold(), api, version.major, version.minor);
    println!("  {} {}", "Extensions:".white().bold(), capabilities.extension_count());
    println!("  {} {}", "Max texture size:".white().bold(), capabilities.max_texture_size());

    for (name, supported) in feature_support(capabilities) {
        if supported {
            println!("  {} {}", "✓".green().bold(), name);
        } else {
            println!("  {} {} {}", "✗".red().bold(), name, "(software fallback)".bright_black());
        }
    }

    println!("{}\n", "==================================".bright_blue().bold());
}
