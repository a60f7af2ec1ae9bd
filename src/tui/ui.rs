use crate::format::{
    format_percent, format_quantity, format_signed_quantity, format_timestamp, format_usd,
    truncate_address,
};
use crate::sync::{ConnectionState, ControlPhase, TradeAnalytics};
use crate::tui::app::{App, ConfirmSelection, InputMode, LogLevel, PendingAction, Tab};
use crate::tui::bindings::{resolve, Panel};
use crate::types::{BotStatus, Severity, TransactionKind};
use ratatui::{
    prelude::*,
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Clear, Dataset, Gauge,
        GraphType, List, ListItem, Paragraph, Row, Table, Tabs, Wrap,
    },
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

fn signed_style(value: Decimal) -> Style {
    if value < Decimal::ZERO {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}

/// Draw the complete TUI. Pure function of `app`: drawing twice yields the same buffer.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: Header, Tabs, Content, Command Input (if active), Footer
    let constraints = if app.input_mode == InputMode::Command {
        vec![
            Constraint::Length(3), // Header
            Constraint::Length(3), // Tabs
            Constraint::Min(8),    // Content
            Constraint::Length(3), // Command input
            Constraint::Length(3), // Footer
        ]
    } else {
        vec![
            Constraint::Length(3), // Header
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Content
            Constraint::Length(3), // Footer
        ]
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    draw_header(frame, layout[0], app);
    draw_tabs(frame, layout[1], app);
    draw_content(frame, layout[2], app);

    if app.input_mode == InputMode::Command {
        draw_command_input(frame, layout[3], app);
        draw_footer(frame, layout[4], app);
    } else {
        draw_footer(frame, layout[3], app);
    }

    draw_notifications(frame, area, app);

    match &app.input_mode {
        InputMode::Confirm(action) => draw_confirmation(frame, area, app, action),
        InputMode::Alert => draw_alert(frame, area, app),
        _ => {}
    }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
    let status = match app.display_status() {
        Some(BotStatus::Running) => Span::styled(
            " RUNNING ",
            Style::default().bg(Color::Green).fg(Color::Black).bold(),
        ),
        Some(BotStatus::Stopped) => Span::styled(
            " STOPPED ",
            Style::default().bg(Color::Yellow).fg(Color::Black).bold(),
        ),
        Some(BotStatus::Error) => Span::styled(
            " ERROR ",
            Style::default().bg(Color::Red).fg(Color::White).bold(),
        ),
        None => Span::styled(" LOADING ", Style::default().bg(Color::DarkGray).fg(Color::White)),
    };

    let connection = match app.merger.state().connection {
        ConnectionState::Connected => Span::styled(" ● live ", Style::default().fg(Color::Green)),
        ConnectionState::Connecting => {
            Span::styled(" ○ connecting ", Style::default().fg(Color::Gray))
        }
        ConnectionState::Disconnected => Span::styled(
            " STALE ",
            Style::default().bg(Color::Magenta).fg(Color::White).bold(),
        ),
    };

    let pending = match app.control.phase() {
        ControlPhase::Pending(cmd) => Span::styled(
            format!(" [{} pending] ", cmd.label()),
            Style::default().fg(Color::Yellow),
        ),
        _ => Span::raw(""),
    };

    let syncing = if app.is_syncing() {
        Span::styled(" ⟳ syncing", Style::default().fg(Color::Cyan))
    } else {
        Span::raw("")
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "SignalForge Dashboard",
            Style::default().fg(Color::Cyan).bold(),
        ),
        Span::raw(" - "),
        status,
        Span::raw(" "),
        connection,
        pending,
        syncing,
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Bot Status "),
    );

    frame.render_widget(header, area);
}

fn draw_tabs(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Tab::all()
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let style = if *t == app.current_tab {
                Style::default().fg(Color::Yellow).bold()
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(format!(" [{}] {} ", i + 1, t.title())).style(style)
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Navigation "))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .select(app.current_tab as usize);

    frame.render_widget(tabs, area);
}

fn draw_content(frame: &mut Frame, area: Rect, app: &App) {
    match app.current_tab {
        Tab::Dashboard => draw_dashboard(frame, area, app),
        Tab::Wallet => draw_wallet(frame, area, app),
        Tab::Trades => draw_trades(frame, area, app),
        Tab::Transactions => draw_transactions(frame, area, app),
        Tab::Analytics => draw_analytics(frame, area, app),
        Tab::Settings => draw_settings(frame, area, app),
        Tab::Logs => draw_logs(frame, area, app),
    }
}

fn draw_command_input(frame: &mut Frame, area: Rect, app: &App) {
    let input = Paragraph::new(Line::from(vec![
        Span::styled("Command: ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(&app.command_input, Style::default().fg(Color::White)),
        Span::styled("▌", Style::default().fg(Color::Yellow)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" 📝 Command Mode (ESC to cancel) "),
    );
    frame.render_widget(input, area);
}

fn loading_line() -> Line<'static> {
    Line::styled("  Loading...", Style::default().fg(Color::Yellow))
}

/// Render every binding of `panel` as `label: value` lines
fn draw_bound_panel(frame: &mut Frame, area: Rect, app: &App, panel: Panel, color: Color) {
    let lines: Vec<Line> = match resolve(panel, app.merger.state(), app.config.address_style()) {
        None => vec![loading_line()],
        Some(values) => values
            .into_iter()
            .map(|v| {
                let style = if v.signed && v.is_negative() {
                    Style::default().fg(Color::Red)
                } else if v.signed {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default().fg(Color::White)
                };
                Line::from(vec![
                    Span::styled(
                        format!("  {:<18}", format!("{}:", v.label)),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(v.value, style),
                ])
            })
            .collect(),
    };

    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", panel.title()))
                .border_style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(widget, area);
}

fn draw_dashboard(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(6)])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(rows[0]);

    draw_bound_panel(frame, top[0], app, Panel::Status, Color::Cyan);
    draw_bound_panel(frame, top[1], app, Panel::Pnl, Color::Green);
    draw_bound_panel(frame, top[2], app, Panel::System, Color::Blue);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    draw_portfolio_chart(frame, bottom[0], app);
    draw_allocation(frame, bottom[1], app);
}

fn draw_portfolio_chart(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 📈 Portfolio Value (USD) ")
        .border_style(Style::default().fg(Color::Green));

    let points: Vec<(f64, f64)> = app
        .merger
        .state()
        .portfolio_points()
        .map(|(i, v)| (*i as f64, to_f64(*v)))
        .collect();

    if points.is_empty() {
        let widget = Paragraph::new(vec![Line::styled(
            "  Waiting for balance data...",
            Style::default().fg(Color::Yellow),
        )])
        .block(block);
        frame.render_widget(widget, area);
        return;
    }

    let x_min = points.first().map(|p| p.0).unwrap_or(0.0);
    let x_max = points.last().map(|p| p.0).unwrap_or(1.0).max(x_min + 1.0);
    let y_min = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let y_max = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    let pad = ((y_max - y_min) * 0.1).max(1.0);
    let (y_lo, y_hi) = ((y_min - pad).max(0.0), y_max + pad);

    let datasets = vec![Dataset::default()
        .name("Total")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([x_min, x_max]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::Gray))
                .bounds([y_lo, y_hi])
                .labels(vec![format!("{:.0}", y_lo), format!("{:.0}", y_hi)]),
        );

    frame.render_widget(chart, area);
}

fn draw_allocation(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 🥧 Allocation ")
        .border_style(Style::default().fg(Color::Magenta));

    let Some(balance) = app.merger.state().balance.as_ref() else {
        frame.render_widget(Paragraph::new(vec![loading_line()]).block(block), area);
        return;
    };

    let [sol, tokens] = balance.allocation();
    let bar = |label: &'static str, value: Decimal, color: Color| {
        Bar::default()
            .label(Line::from(label))
            .value(to_f64(value).max(0.0).round() as u64)
            .text_value(format_usd(value))
            .style(Style::default().fg(color))
    };
    let bars = [
        bar("SOL", sol, Color::Cyan),
        bar("Tokens", tokens, Color::Magenta),
    ];

    let chart = BarChart::default()
        .block(block)
        .bar_width(12)
        .bar_gap(3)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn empty_message(message: &'static str) -> Paragraph<'static> {
    Paragraph::new(vec![
        Line::raw(""),
        Line::styled(format!("  {}", message), Style::default().fg(Color::Yellow)),
    ])
}

fn draw_wallet(frame: &mut Frame, area: Rect, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(5)])
        .split(area);
    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[0]);

    draw_bound_panel(frame, top[0], app, Panel::Balance, Color::Green);
    draw_allocation(frame, top[1], app);

    let balance = app.merger.state().balance.as_ref();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            " 🪙 Tokens ({}) ",
            balance.map(|b| b.tokens.len()).unwrap_or(0)
        ))
        .border_style(Style::default().fg(Color::Yellow));

    let Some(balance) = balance else {
        frame.render_widget(Paragraph::new(vec![loading_line()]).block(block), rows[1]);
        return;
    };
    if balance.tokens.is_empty() {
        frame.render_widget(empty_message("No tokens found").block(block), rows[1]);
        return;
    }

    let style = app.config.address_style();
    let table_rows: Vec<Row> = balance
        .tokens
        .iter()
        .map(|t| {
            Row::new(vec![
                Cell::from(Span::styled(t.symbol.clone(), Style::default().fg(Color::Cyan).bold())),
                Cell::from(truncate_address(&t.address, style)),
                Cell::from(format_quantity(t.balance, &t.symbol)),
                Cell::from(format_usd(t.price_usd)),
                Cell::from(Span::styled(
                    format_usd(t.value_usd),
                    Style::default().fg(Color::Green),
                )),
            ])
        })
        .collect();

    let table = Table::new(
        table_rows,
        [
            Constraint::Length(10),
            Constraint::Length(22),
            Constraint::Length(22),
            Constraint::Length(14),
            Constraint::Min(12),
        ],
    )
    .header(
        Row::new(vec!["Symbol", "Address", "Balance", "Price", "Value"])
            .style(Style::default().fg(Color::Gray).bold()),
    )
    .block(block);
    frame.render_widget(table, rows[1]);
}

fn draw_trades(frame: &mut Frame, area: Rect, app: &App) {
    let history = app.merger.state().history.as_ref();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            " 📋 Trades ({}) ",
            history.map(|h| h.trades.len()).unwrap_or(0)
        ))
        .border_style(Style::default().fg(Color::Blue));

    let Some(history) = history else {
        frame.render_widget(Paragraph::new(vec![loading_line()]).block(block), area);
        return;
    };
    if history.trades.is_empty() {
        frame.render_widget(empty_message("No trades yet").block(block), area);
        return;
    }

    let style = app.config.address_style();
    // Newest first
    let rows: Vec<Row> = history
        .trades
        .iter()
        .rev()
        .map(|t| {
            let (returned, profit, outcome) = match (t.amount_returned, t.derived_profit()) {
                (Some(ret), Some(profit)) => (
                    Cell::from(format_quantity(ret, "SOL")),
                    Cell::from(Span::styled(
                        format_signed_quantity(profit, "SOL"),
                        signed_style(profit),
                    )),
                    if profit > Decimal::ZERO {
                        Cell::from(Span::styled("WIN", Style::default().fg(Color::Green).bold()))
                    } else {
                        Cell::from(Span::styled("LOSS", Style::default().fg(Color::Red).bold()))
                    },
                ),
                _ => (
                    Cell::from(Span::styled("pending", Style::default().fg(Color::Gray))),
                    Cell::from(Span::styled("pending", Style::default().fg(Color::Gray))),
                    Cell::from(Span::styled("OPEN", Style::default().fg(Color::Yellow))),
                ),
            };
            Row::new(vec![
                Cell::from(format_timestamp(&t.timestamp)),
                Cell::from(Span::styled(
                    truncate_address(&t.token_address, style),
                    Style::default().fg(Color::Cyan),
                )),
                Cell::from(format_quantity(t.amount_invested, "SOL")),
                returned,
                profit,
                outcome,
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(20),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(15),
            Constraint::Min(6),
        ],
    )
    .header(
        Row::new(vec!["Date", "Token", "Invested", "Returned", "Profit", "Result"])
            .style(Style::default().fg(Color::Gray).bold()),
    )
    .block(block);
    frame.render_widget(table, area);
}

fn draw_transactions(frame: &mut Frame, area: Rect, app: &App) {
    let history = app.merger.state().history.as_ref();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            " 💸 Transactions ({}) ",
            history.map(|h| h.transactions.len()).unwrap_or(0)
        ))
        .border_style(Style::default().fg(Color::Magenta));

    let Some(history) = history else {
        frame.render_widget(Paragraph::new(vec![loading_line()]).block(block), area);
        return;
    };
    if history.transactions.is_empty() {
        frame.render_widget(empty_message("No transactions yet").block(block), area);
        return;
    }

    let rows: Vec<Row> = history
        .transactions
        .iter()
        .rev()
        .map(|tx| {
            let kind_style = match tx.kind {
                TransactionKind::Send => Style::default().fg(Color::Red),
                TransactionKind::Receive => Style::default().fg(Color::Green),
            };
            Row::new(vec![
                Cell::from(format_timestamp(&tx.timestamp)),
                Cell::from(Span::styled(tx.kind.label(), kind_style)),
                Cell::from(tx.asset.clone()),
                Cell::from(format_quantity(tx.amount, &tx.asset)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(20),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Min(12),
        ],
    )
    .header(
        Row::new(vec!["Date", "Type", "Asset", "Amount"])
            .style(Style::default().fg(Color::Gray).bold()),
    )
    .block(block);
    frame.render_widget(table, area);
}

fn draw_analytics(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 📊 Trade Analytics ")
        .border_style(Style::default().fg(Color::Cyan));

    let Some(history) = app.merger.state().history.as_ref() else {
        frame.render_widget(Paragraph::new(vec![loading_line()]).block(block), area);
        return;
    };

    let stats = TradeAnalytics::from_trades(&history.trades);
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(9), Constraint::Length(3)])
        .split(area);

    let row = |label: &str, value: String, style: Style| {
        Line::from(vec![
            Span::styled(format!("  {:<18}", label), Style::default().fg(Color::Gray)),
            Span::styled(value, style),
        ])
    };
    let plain = Style::default().fg(Color::White);
    let lines = vec![
        row("Total trades:", stats.total.to_string(), plain),
        row("Successful:", stats.successful.to_string(), Style::default().fg(Color::Green)),
        row("Failed:", stats.failed.to_string(), Style::default().fg(Color::Red)),
        row("Open:", stats.pending.to_string(), Style::default().fg(Color::Yellow)),
        row("Total invested:", format_quantity(stats.total_invested, "SOL"), plain),
        row("Total returned:", format_quantity(stats.total_returned, "SOL"), plain),
        row(
            "PnL:",
            format!(
                "{} ({})",
                format_signed_quantity(stats.pnl_amount, "SOL"),
                format_percent(stats.pnl_percentage)
            ),
            signed_style(stats.pnl_amount),
        ),
        row(
            "Average return:",
            format_percent(stats.average_return),
            signed_style(stats.average_return),
        ),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), layout[0]);

    let percent = to_f64(stats.success_rate).clamp(0.0, 100.0).round() as u16;
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Success Rate "))
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Red))
        .percent(percent)
        .label(format_percent(stats.success_rate));
    frame.render_widget(gauge, layout[1]);
}

fn draw_settings(frame: &mut Frame, area: Rect, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    draw_bound_panel(frame, layout[0], app, Panel::Settings, Color::Yellow);

    let help = vec![
        Line::styled("  Commands:", Style::default().fg(Color::Gray)),
        Line::styled(
            "    /set amount <sol>              - Trade amount (> 0)",
            Style::default().fg(Color::Gray),
        ),
        Line::styled(
            "    /set multiplier <x>            - Target multiplier (> 1)",
            Style::default().fg(Color::Gray),
        ),
        Line::styled(
            "    /send <receiver> <amt> [asset] - Send funds from the bot wallet",
            Style::default().fg(Color::Gray),
        ),
    ];
    let widget = Paragraph::new(help).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" ⚙️ Edit ")
            .border_style(Style::default().fg(Color::Gray)),
    );
    frame.render_widget(widget, layout[1]);
}

fn draw_logs(frame: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .logs
        .iter()
        .rev() // Show newest first
        .take(50)
        .map(|log| {
            let (prefix, style) = match log.level {
                LogLevel::Info => ("ℹ️ ", Style::default().fg(Color::Cyan)),
                LogLevel::Warning => ("⚠️ ", Style::default().fg(Color::Yellow)),
                LogLevel::Error => ("❌", Style::default().fg(Color::Red)),
                LogLevel::Success => ("✅", Style::default().fg(Color::Green)),
            };

            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("[{}] ", log.timestamp),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw(prefix),
                Span::styled(&log.message, style),
            ]))
        })
        .collect();

    let logs_list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" 📝 Logs ({}) ", app.logs.len()))
            .border_style(Style::default().fg(Color::Gray)),
    );

    frame.render_widget(logs_list, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let status = app.bot_status();
    let key = |k: &'static str, enabled: bool, color: Color| {
        if enabled {
            Span::styled(k, Style::default().fg(color).bold())
        } else {
            Span::styled(k, Style::default().fg(Color::DarkGray))
        }
    };

    let shortcuts = Line::from(vec![
        key(" [G]", app.control.can_start(status), Color::Green),
        Span::raw("o  "),
        key("[S]", app.control.can_stop(status), Color::Yellow),
        Span::raw("top  "),
        Span::styled("[R]", Style::default().fg(Color::Cyan).bold()),
        Span::raw("efresh  "),
        Span::styled("[E]", Style::default().fg(Color::Blue).bold()),
        Span::raw("xport  "),
        Span::styled("[Y]", Style::default().fg(Color::Blue).bold()),
        Span::raw("ank addr  "),
        Span::styled("[:]", Style::default().fg(Color::Magenta).bold()),
        Span::raw("Cmd  "),
        Span::styled("[H]", Style::default().fg(Color::Blue).bold()),
        Span::raw("elp  "),
        Span::styled("[Q]", Style::default().fg(Color::Red).bold()),
        Span::raw("uit"),
    ]);

    let footer = Paragraph::new(shortcuts)
        .block(Block::default().borders(Borders::ALL).title(" Shortcuts "))
        .alignment(Alignment::Center);

    frame.render_widget(footer, area);
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::Cyan,
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}

/// Toast stack in the top-right corner, newest on top
fn draw_notifications(frame: &mut Frame, area: Rect, app: &App) {
    const HEIGHT: u16 = 4;
    let width = 46.min(area.width);
    let bottom = area.y + area.height;
    let mut y = area.y + 3;

    let visible: Vec<_> = app.notifications.visible().collect();
    for notification in visible.iter().rev() {
        if y + HEIGHT > bottom {
            break;
        }
        let rect = Rect {
            x: area.x + area.width - width,
            y,
            width,
            height: HEIGHT,
        };
        let color = severity_color(notification.severity);
        let widget = Paragraph::new(notification.message.as_str())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color))
                    .title(Span::styled(
                        format!(" {} ", notification.title),
                        Style::default().fg(color).bold(),
                    )),
            );
        frame.render_widget(Clear, rect);
        frame.render_widget(widget, rect);
        y += HEIGHT;
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn draw_confirmation(frame: &mut Frame, area: Rect, app: &App, action: &PendingAction) {
    let rect = centered_rect(54, 7, area);
    let button = |label: &'static str, selected: bool| {
        if selected {
            Span::styled(label, Style::default().bg(Color::Yellow).fg(Color::Black).bold())
        } else {
            Span::styled(label, Style::default().fg(Color::Gray))
        }
    };

    let lines = vec![
        Line::raw(""),
        Line::from(action.prompt()).alignment(Alignment::Center),
        Line::raw(""),
        Line::from(vec![
            button("[ Yes ]", app.confirm_selection == ConfirmSelection::Yes),
            Span::raw("    "),
            button("[ No ]", app.confirm_selection == ConfirmSelection::No),
        ])
        .alignment(Alignment::Center),
    ];

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Confirm "),
    );
    frame.render_widget(Clear, rect);
    frame.render_widget(widget, rect);
}

fn draw_alert(frame: &mut Frame, area: Rect, app: &App) {
    let Some(alert) = &app.alert else {
        return;
    };
    let rect = centered_rect(60, 9, area);

    let mut lines = vec![Line::raw("")];
    lines.extend(alert.message.lines().map(|l| Line::from(format!("  {}", l))));
    lines.push(Line::raw(""));
    lines.push(
        Line::styled("Press Enter to dismiss", Style::default().fg(Color::Gray))
            .alignment(Alignment::Center),
    );

    let widget = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red))
            .title(Span::styled(
                format!(" {} ", alert.title),
                Style::default().fg(Color::Red).bold(),
            )),
    );
    frame.render_widget(Clear, rect);
    frame.render_widget(widget, rect);
}
