use colored::Colorize;

const LOGO: &[&str] = &[
    r"   ██╗  ██╗███████╗██████╗ ███╗   ███╗███████╗███████╗",
    r"   ██║  ██║██╔════╝██╔══██╗████╗ ████║██╔════╝██╔════╝",
    r"   ███████║█████╗  ██████╔╝██╔████╔██║█████╗  ███████╗",
    r"   ██╔══██║██╔══╝  ██╔══██╗██║╚██╔╝██║██╔══╝  ╚════██║",
    r"   ██║  ██║███████╗██║  ██║██║ ╚═╝ ██║███████╗███████║",
    r"   ╚═╝  ╚═╝╚══════╝╚═╝  ╚═╝╚═╝     ╚═╝╚══════╝╚══════╝",
    r"          ░░ Condition-Based Trigger Rule Engine ░░    ",
];

pub fn print_banner() {
    let colors = [
        colored::Color::Magenta,
        colored::Color::Magenta,
        colored::Color::BrightMagenta,
        colored::Color::BrightWhite,
        colored::Color::Magenta,
        colored::Color::Magenta,
        colored::Color::BrightBlack,
    ];

    for (line, &color) in LOGO.iter().zip(colors.iter()) {
        println!("{}", line.color(color).bold());
    }
}

pub fn print_version_block(version: &str) {
    print_banner();
    println!();
    println!("  {} {}", "Version".dimmed(), version.bright_magenta().bold());
    println!(
        "  {} {}",
        "  Arch ".dimmed(),
        std::env::consts::ARCH.bright_white()
    );
    println!(
        "  {} {}",
        "    OS ".dimmed(),
        std::env::consts::OS.bright_white()
    );
    println!();
}
