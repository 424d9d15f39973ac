use std::error::Error;

use tracing_subscriber::EnvFilter;

use booking_client::config::AppConfig;
use booking_client::domain::BookingRecord;
use booking_client::ui::{
    BookingUiState, BookingViewModel, ErrorCategory, SegmentListViewModel, format_remaining,
};

const USAGE: &str = "usage: booking-client [show|refresh|watch|segments|clear-cache]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "show".to_string());
    let config = AppConfig::from_env()?;
    let manager = config.build_manager()?;

    match command.as_str() {
        "show" | "refresh" | "watch" => {
            let vm = BookingViewModel::start(manager, config.view.clone());
            let mut states = vm.subscribe_ui_state();

            if command == "refresh" {
                vm.refresh().await;
            } else {
                vm.load_initial().await;
            }
            if let Some(state) = states.wait_for(|s| !s.is_loading()).await {
                print_state(&state);
            }

            if command == "watch" {
                watch(&vm, states).await?;
            }
            vm.shutdown().await;
        }
        "segments" => {
            let list = SegmentListViewModel::new(manager);
            list.load_data().await;
            let segments = list.segments();
            if segments.is_empty() {
                println!("No segments available.");
            }
            for segment in segments {
                let pair = &segment.origin_and_destination_pair;
                println!(
                    "{:>3}  {} ({}) -> {} ({})",
                    segment.id,
                    pair.origin.display_name,
                    pair.origin_city,
                    pair.destination.display_name,
                    pair.destination_city
                );
            }
        }
        "clear-cache" => {
            manager.clear_cache().await?;
            println!("Cache cleared.");
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(2);
        }
    }

    Ok(())
}

/// Print every state change and countdown until Ctrl-C.
async fn watch(
    vm: &BookingViewModel,
    mut states: booking_client::publish::Subscription<BookingUiState>,
) -> Result<(), Box<dyn Error>> {
    let mut remaining = vm.subscribe_remaining_time();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                return Ok(());
            }
            Some(state) = states.next() => print_state(&state),
            Some(secs) = remaining.next() => match secs {
                Some(secs) => println!("Valid for {}", format_remaining(secs)),
                None => println!("No valid booking cached"),
            },
            else => return Ok(()),
        }
    }
}

fn print_state(state: &BookingUiState) {
    match state {
        BookingUiState::Loading => println!("Loading..."),
        BookingUiState::Success(record) => print_booking(record),
        BookingUiState::Error(error) => {
            let category = ErrorCategory::of(error);
            println!("{} (run `booking-client refresh` to retry)", category.message(error));
        }
    }
}

fn print_booking(record: &BookingRecord) {
    println!("Ship reference: {}", record.ship_reference);
    println!(
        "Ticket checking: {}",
        if record.can_issue_ticket_checking {
            "available"
        } else {
            "not available"
        }
    );
    println!("Duration: {} min", record.duration_seconds / 60);
    println!("Segments:");
    for segment in &record.segments {
        let pair = &segment.origin_and_destination_pair;
        println!(
            "  {} {} -> {} {}",
            pair.origin.code, pair.origin_city, pair.destination.code, pair.destination_city
        );
    }
}
