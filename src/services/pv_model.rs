/// ============================================================
///  Daily PV Energy Estimation
///
///  Capacity-based model on daily irradiance sums:
///   1. Unit conversion   – G [MJ/m²/day] → G [kWh/m²/day]
///   2. Daily energy      – E_day = G × P_kWp × PR
///   3. Monthly totals    – grouped by YYYY-MM, rounded on every addition
///   4. Annual total      – sum of the monthly totals
///   5. Averages          – mean daily / mean monthly
///   6. Advisory          – configured orientation, echoed
///
///  Every published figure is rounded half-up to 2 decimals.
/// ============================================================

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{
    Advisory, Configuration, EstimationResult, KwhSeries, WeatherDataset,
};

// ─── Physical constants ──────────────────────────────────────
/// 1 kWh = 3.6 MJ
const MJ_PER_KWH: f64 = 3.6;

/// Irradiation conversion, MJ/m² → kWh/m².
#[inline]
pub fn mj_to_kwh(mj: f64) -> f64 {
    mj / MJ_PER_KWH
}

/// Round half-up to two decimals. Non-finite input becomes 0; values too
/// large to scale carry no fractional digits and are returned as-is.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    let floor = scaled.floor();
    let rounded = if scaled - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded / 100.0
}

/// Main entry point – one call per estimation request.
///
/// Pure: no I/O, and points are processed strictly in dataset order so
/// repeated runs sum in the same order. Days without a usable irradiance
/// value produce 0 kWh.
pub fn estimate(dataset: &WeatherDataset, config: &Configuration) -> Result<EstimationResult> {
    config.validate()?;

    // ── 1–2. Daily energy ──────────────────────────────────────
    let mut daily_kwh = KwhSeries::with_capacity(dataset.points.len());
    let mut missing_days = 0usize;
    for point in &dataset.points {
        let g_mj = match point.shortwave_radiation_mj_m2 {
            Some(v) if v.is_finite() => v,
            _ => {
                missing_days += 1;
                0.0
            }
        };
        let e_day = mj_to_kwh(g_mj) * config.system_capacity_kwp * config.performance_ratio;
        daily_kwh.insert(point.date_time.format("%Y-%m-%d").to_string(), round2(e_day));
    }
    if missing_days > 0 {
        warn!(
            "{} of {} days have no irradiance value, counted as 0 kWh",
            missing_days,
            dataset.points.len()
        );
    }

    // ── 3. Monthly totals ──────────────────────────────────────
    let monthly_kwh = aggregate_monthly(&daily_kwh);

    // ── 4. Annual total ────────────────────────────────────────
    let annual_kwh = round2(monthly_kwh.values().sum());

    // ── 5. Averages ────────────────────────────────────────────
    let avg_daily = round2(mean(daily_kwh.values()));
    let avg_monthly = round2(mean(monthly_kwh.values()));

    debug!(
        "Estimated {} days / {} months: annual={:.2} kWh avg_daily={:.2} avg_monthly={:.2}",
        daily_kwh.len(),
        monthly_kwh.len(),
        annual_kwh,
        avg_daily,
        avg_monthly
    );

    // ── 6. Advisory (placeholder: configured orientation) ─────
    let advisory = Advisory {
        optimal_tilt_deg: config.tilt_deg,
        optimal_azimuth_deg: config.azimuth_deg,
    };

    Ok(EstimationResult {
        daily_kwh,
        monthly_kwh,
        annual_kwh,
        avg_daily,
        avg_monthly,
        advisory,
    })
}

// ─── Monthly aggregation ─────────────────────────────────────
/// Groups daily values by the `YYYY-MM` prefix of their label.
///
/// The running total is rounded after every addition, so a month's value
/// can differ by a cent from rounding the plain sum once.
fn aggregate_monthly(daily: &KwhSeries) -> KwhSeries {
    let mut monthly = KwhSeries::new();
    for (date, kwh) in daily.iter() {
        let month = date.get(..7).unwrap_or(date);
        let running = monthly.get(month).unwrap_or(0.0);
        monthly.insert(month, round2(running + kwh));
    }
    monthly
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
