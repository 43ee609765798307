use fclean::cli::Args;
use fclean::events::{AuditEvent, EventLevel};
use fclean::session::{BackgroundRunner, CleanSession};
use fclean::whitelist::AddEntry;
use fclean::{FileRecord, UserConfig};

use std::io::{self, Write};

fn main() {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    let mut user_config = UserConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load user config: {}", e);
        UserConfig::default()
    });

    let mut session = CleanSession::new();
    for name in &user_config.custom_whitelist {
        session.add_whitelist_entry(name);
    }

    // --protect entries join this session and are persisted for later ones
    let mut config_changed = false;
    for name in &args.protect {
        if session.add_whitelist_entry(name) == AddEntry::Added {
            user_config.custom_whitelist.push(name.clone());
            config_changed = true;
        } else {
            println!("Whitelist entry already present: {}", name);
        }
    }
    if config_changed {
        if let Err(e) = user_config.save() {
            eprintln!("Warning: Failed to save user config: {}", e);
        }
    }

    let request = args.scan_request(&user_config.default_extensions);
    let runner = BackgroundRunner::new();

    // Scan on a worker, relaying progress as it happens
    let mut scan_task = runner.spawn_scan(
        request,
        session.whitelist().clone(),
        session.cancel_flag(),
    );
    while let Some(event) = scan_task.next_event() {
        print_event(&event);
    }
    let records = match scan_task.wait() {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if records.is_empty() {
        println!("No matching files found.");
        return;
    }

    if let Err(e) = session.stage_candidates(records) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    print_candidates(session.candidates());
    println!(
        "\nFound {} files, total size {}",
        session.candidates().len(),
        format_size(session.total_size_bytes())
    );

    if args.dry_run {
        println!("[DRY RUN] No files will be deleted");
    }

    if !args.assume_yes && !confirm_deletion(&args) {
        let _ = session.decline();
        println!("Aborted, nothing deleted.");
        return;
    }

    let candidates = match session.confirm() {
        Ok(candidates) => candidates,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut delete_task = runner.spawn_deletion(
        candidates,
        args.delete_mode(),
        args.dry_run,
        session.cancel_flag(),
    );
    while let Some(event) = delete_task.next_event() {
        print_event(&event);
    }
    let summary = match delete_task.wait() {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let _ = session.complete();

    println!(
        "\nDone: {} deleted, {} failed",
        summary.success_count, summary.error_count
    );
    session.reset();

    if summary.error_count > 0 {
        std::process::exit(1);
    }
}

fn print_event(event: &AuditEvent) {
    let time = event
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M:%S");
    match event.level {
        EventLevel::Info => println!("[{}] {}", time, event.message),
        EventLevel::Warning => eprintln!("[{}] WARN {}", time, event.message),
        EventLevel::Error => eprintln!("[{}] ERROR {}", time, event.message),
    }
}

fn print_candidates(records: &[FileRecord]) {
    println!();
    for record in records {
        println!(
            "{:>10}  {}  {}",
            format_size(record.size_bytes),
            record.modified_at.format("%Y-%m-%d %H:%M:%S"),
            record.path.display()
        );
    }
}

fn confirm_deletion(args: &Args) -> bool {
    let mode = if args.dry_run {
        "simulate deleting".to_string()
    } else {
        format!("{} delete", args.delete_mode())
    };
    print!("Proceed to {} these files? [y/N] ", mode);
    let _ = io::stdout().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    if kb < 1024.0 {
        format!("{:.1} KB", kb)
    } else {
        format!("{:.1} MB", kb / 1024.0)
    }
}
