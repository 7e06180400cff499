use colored::Colorize;

const BANNER: &str = r"
  ___  ___ ___ _ __   ___  __| | ___  ___| | __
 / __|/ __/ _ \ '_ \ / _ \/ _` |/ _ \/ __| |/ /
 \__ \ (_|  __/ | | |  __/ (_| |  __/ (__|   <
 |___/\___\___|_| |_|\___|\__,_|\___|\___|_|\_\
";

pub fn print_banner_with_version() {
    println!("{}", BANNER.cyan());
    println!(
        "  {} {}  {}",
        "scenedeck".bold(),
        env!("CARGO_PKG_VERSION"),
        "scene-based presentation player".dimmed()
    );
    println!();
}
