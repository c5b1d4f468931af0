//! Line-driven front desk
//!
//! Digits typed on stdin go to the identification session (a barcode
//! scanner in keyboard mode works the same way). Lines starting with `:`
//! are desk commands:
//!
//! ```text
//! :dismiss                 close the shown record
//! :reset                   clear everything
//! :renew <dni> <amount>    record a payment and advance the due date
//! :pay <dni> <amount>      record a payment, due date untouched
//! :list [term]             members, newest first
//! :today                   today's attendance
//! :stats <dni> [YYYY-MM]   monthly attendance of a member
//! :quit
//! ```

use std::sync::Arc;

use anyhow::Context;
use front_desk::attendance::{self, MonthCursor};
use front_desk::clock::{self, CivilCalendar};
use front_desk::session::{Notice, SessionView};
use front_desk::{Config, KioskSession, MemoryGateway, PaymentLedger, Roster};
use shared::{MemberGateway, MemberId};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    front_desk::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!("Gym front desk starting...");

    let calendar = config.calendar();
    let gateway = build_gateway(&config, &calendar)?;
    let ledger = PaymentLedger::new(gateway.clone());

    let (handle, mut notices) = KioskSession::spawn(
        gateway.clone(),
        calendar.clone(),
        config.session_config(),
        Arc::new(|| {
            tracing::trace!("Input focused");
        }),
    );

    let mut views = handle.subscribe();
    let render_calendar = calendar.clone();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = views.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let view = views.borrow_and_update().clone();
                    render(&view, &render_calendar);
                }
                notice = notices.recv() => {
                    let Some(notice) = notice else { break };
                    render_notice(&notice);
                }
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some(":quit") => break,
            Some(":dismiss") => handle.dismiss(),
            Some(":reset") => handle.reset(),
            Some(":renew") | Some(":pay") => {
                let renew = line.starts_with(":renew");
                let (Some(dni), Some(amount)) = (parts.next(), parts.next()) else {
                    println!("usage: :renew|:pay <dni> <amount>");
                    continue;
                };
                record_payment(&ledger, renew, dni, amount).await;
            }
            Some(":list") => {
                let term = parts.collect::<Vec<_>>().join(" ");
                list_members(gateway.as_ref(), &calendar, &term).await;
            }
            Some(":today") => show_today(gateway.as_ref(), &calendar).await,
            Some(":stats") => {
                let Some(dni) = parts.next() else {
                    println!("usage: :stats <dni> [YYYY-MM]");
                    continue;
                };
                show_stats(gateway.as_ref(), &calendar, &config, dni, parts.next()).await;
            }
            Some(cmd) if cmd.starts_with(':') => println!("unknown command {}", cmd),
            _ => handle.type_keys(line),
        }
    }

    handle.shutdown().await;
    tracing::info!("Gym front desk stopped");
    Ok(())
}

fn build_gateway(
    config: &Config,
    calendar: &CivilCalendar,
) -> anyhow::Result<Arc<dyn MemberGateway>> {
    if !config.offline {
        let client = config
            .client_config()
            .build_http_client()
            .context("Failed to build HTTP client")?;
        tracing::info!(base_url = %client.base_url(), "Using members API");
        return Ok(Arc::new(client));
    }

    let store = match &config.seed_file {
        Some(path) => MemoryGateway::from_json_file(calendar.clone(), path.as_ref())
            .with_context(|| format!("Failed to load seed file {}", path))?,
        None => MemoryGateway::new(calendar.clone()),
    };
    tracing::info!("Offline mode, using in-memory store");
    Ok(Arc::new(store))
}

fn render(view: &SessionView, calendar: &CivilCalendar) {
    match &view.record {
        Some(shown) => {
            let m = &shown.member;
            println!(
                "[{}] {} {} | {} | vence {} | plan {} | ingresos hoy: {}",
                m.id,
                m.name,
                m.last_name,
                shown.status.label(),
                clock::format_long_date(m.payment_due_date),
                m.plan_type.label(),
                shown.check_ins_today.len()
            );
            if let Some(last) = m.last_payment() {
                println!(
                    "    último pago {} el {}",
                    clock::format_amount(last.amount),
                    clock::format_date_time(last.payment_date, calendar.tz())
                );
            }
        }
        None if !view.input.is_empty() => println!("DNI: {}", view.input),
        None => {}
    }
}

fn render_notice(notice: &Notice) {
    println!("! {}", notice.message);
}

async fn record_payment(ledger: &PaymentLedger, renew: bool, dni: &str, amount: &str) {
    let id = match MemberId::parse(dni) {
        Ok(id) => id,
        Err(e) => {
            println!("{}", e.message);
            return;
        }
    };

    let result = if renew {
        ledger.renew(&id, amount).await
    } else {
        ledger.record_ledger_payment(&id, amount).await
    };

    match result {
        Ok(member) => println!(
            "Pago registrado para {} ({} pagos), vence {}",
            member.full_name(),
            member.payment_history.len(),
            clock::format_long_date(member.payment_due_date)
        ),
        Err(e) => println!("{}", shared::AppError::from(e).message),
    }
}

async fn list_members(gateway: &dyn MemberGateway, calendar: &CivilCalendar, term: &str) {
    let members = match gateway.list().await {
        Ok(members) => members,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    let roster = Roster::from_listing(members);
    let today = calendar.today();
    for m in roster.search(term) {
        println!(
            "{} {:<30} {:<8} {}",
            m.id,
            m.full_name(),
            m.status(today).label(),
            m.payment_due_date
        );
    }
    let summary = roster.summary(today);
    println!(
        "{} alumnos, {} al día, {} vencidos",
        summary.total, summary.current, summary.overdue
    );
}

async fn show_today(gateway: &dyn MemberGateway, calendar: &CivilCalendar) {
    let today = calendar.today();
    match gateway.attendance_by_date(today).await {
        Ok(attendees) => {
            println!("{}: {} asistentes", clock::format_long_date(today), attendees.len());
            for a in &attendees {
                let times: Vec<String> = a
                    .check_ins
                    .iter()
                    .map(|ts| clock::format_date_time(*ts, calendar.tz()))
                    .collect();
                println!("  {} {} {} [{}]", a.id, a.name, a.last_name, times.join(", "));
            }
        }
        Err(e) => println!("{}", e),
    }
}

async fn show_stats(
    gateway: &dyn MemberGateway,
    calendar: &CivilCalendar,
    config: &Config,
    dni: &str,
    month: Option<&str>,
) {
    let cursor = match month {
        Some(raw) => match clock::parse_date(&format!("{}-01", raw)) {
            Ok(date) => MonthCursor::containing(date),
            Err(e) => {
                println!("{}", e.message);
                return;
            }
        },
        None => MonthCursor::containing(calendar.today()),
    };

    let member = match MemberId::parse(dni) {
        Ok(id) => gateway.find_by_id(&id).await,
        Err(e) => {
            println!("{}", e.message);
            return;
        }
    };
    let member = match member {
        Ok(member) => member,
        Err(e) => {
            println!("{}", e);
            return;
        }
    };

    let tz = calendar.tz();
    let summary =
        attendance::monthly_summary(&member.attendance_log, cursor.month(), cursor.year(), tz);
    println!("{} - {}", member.full_name(), cursor.label());

    let grid = attendance::build_month_calendar(
        cursor.month(),
        cursor.year(),
        &member.attendance_log,
        tz,
        config.week_start,
    );
    for row in grid {
        let cells: Vec<String> = row
            .iter()
            .map(|cell| match cell {
                Some(day) if day.has_attendance => format!("{:>3}*", day.day),
                Some(day) => format!("{:>3} ", day.day),
                None => "    ".to_string(),
            })
            .collect();
        println!("{}", cells.join(""));
    }

    for week in &summary.weeks {
        println!("Semana {}: {} asistencias", week.week, week.count);
    }
    println!(
        "Total del mes: {} | Promedio semanal: {}",
        summary.total, summary.weekly_average
    );
}
