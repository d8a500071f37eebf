//! Plain-text rendering for the terminal.

use skyview_core::{Coordinates, ForecastSnapshot, SearchUpdate};

pub fn place_line(place: &Coordinates) -> String {
    let region = place.region_label();
    if region.is_empty() {
        format!("{} {}", place.display_flag(), place.city())
    } else {
        format!("{} {} ({region})", place.display_flag(), place.city())
    }
}

pub fn print_place(place: &Coordinates) {
    println!(
        "{}  [{:.4}, {:.4}]",
        place_line(place),
        place.latitude(),
        place.longitude()
    );
}

pub fn print_candidates(found: &[Coordinates]) {
    if found.is_empty() {
        println!("No matches.");
        return;
    }
    for (i, place) in found.iter().enumerate() {
        print!("{:>2}. ", i + 1);
        print_place(place);
    }
}

pub fn print_update(update: &SearchUpdate) {
    println!("-- {} --", update.query);
    print_candidates(&update.results);
}

pub fn render_snapshot(snapshot: &ForecastSnapshot) -> String {
    let mut out = String::new();
    let now = &snapshot.current;

    out.push_str(&format!("Weather for {}\n", snapshot.city));
    out.push_str(&format!(
        "  Now: {}°C, feels like {}°C, {}\n",
        now.temperature, now.feels_like, now.icon
    ));
    out.push_str(&format!(
        "  Rain {}%  UV {}  Wind {:.1} km/h\n",
        now.chance_of_rain, now.uv_index, now.wind_speed
    ));

    if !snapshot.hourly.is_empty() {
        out.push_str("\nNext hours:\n");
        for point in &snapshot.hourly {
            out.push_str(&format!(
                "  {}  {:>4}°C  UV {:<2} {}\n",
                point.time.format("%H:%M"),
                point.temperature,
                point.uv_index,
                point.icon
            ));
        }
    }

    if !snapshot.daily.is_empty() {
        out.push_str("\nDaily:\n");
        for day in &snapshot.daily {
            let rain = day
                .chance_of_rain
                .map(|p| format!("  rain {p:.0}%"))
                .unwrap_or_default();
            out.push_str(&format!(
                "  {:<5} {:>4}° / {:>4}°  {:<6}{rain}\n",
                day.label, day.temperature_max, day.temperature_min, day.icon
            ));
        }
    }

    out
}

pub fn print_snapshot(snapshot: &ForecastSnapshot) {
    print!("{}", render_snapshot(snapshot));
}
