use super::{ProcessSnapshot, ProcessState};
use crossterm::{
    cursor::MoveUp,
    queue,
    terminal::{Clear, ClearType},
};
use log::error;
use std::{
    io::{self, Stdout, Write},
    time::Duration,
};
use tui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table},
    Terminal,
};

const HEADERS: [&str; 8] = [
    "PID",
    "Priority",
    "State",
    "Core",
    "Turn Time",
    "Wait Time",
    "CPU Time",
    "Remain Time",
];

/// Receives the process table once per dispatcher tick.
pub trait SnapshotSink {
    fn show(&mut self, snapshots: &[ProcessSnapshot]);
}

impl<F> SnapshotSink for F
where
    F: FnMut(&[ProcessSnapshot]),
{
    fn show(&mut self, snapshots: &[ProcessSnapshot]) {
        self(snapshots)
    }
}

fn seconds(duration: Duration) -> String {
    format!("{:.1}", duration.as_secs_f64())
}

fn core_label(core: Option<u8>) -> String {
    core.map_or_else(|| "--".to_owned(), |core| core.to_string())
}

fn columns(snapshot: &ProcessSnapshot) -> [String; 8] {
    [
        snapshot.pid.to_string(),
        snapshot.priority.to_string(),
        snapshot.state.to_string(),
        core_label(snapshot.core),
        seconds(snapshot.turnaround),
        seconds(snapshot.wait),
        seconds(snapshot.cpu),
        seconds(snapshot.remaining),
    ]
}

/// Full-screen process table.
pub struct DisplayTerminal {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    title: String,
}

impl DisplayTerminal {
    pub fn new(title: &str) -> Result<Self, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        Ok(Self {
            terminal,
            title: title.to_owned(),
        })
    }

    pub fn draw(&mut self, snapshots: &[ProcessSnapshot]) -> Result<(), io::Error> {
        let title = self.title.as_str();
        let running = snapshots.iter().filter(|s| s.core.is_some()).count();
        let terminated = snapshots
            .iter()
            .filter(|s| s.state == ProcessState::Terminated)
            .count();

        self.terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .margin(1)
                .constraints([Constraint::Length(3), Constraint::Min(5)])
                .split(f.size());

            let summary = Paragraph::new(format!(
                "{} launched | {} running | {} terminated",
                snapshots.len(),
                running,
                terminated
            ))
            .style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::LightBlue),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Scheduler")
                    .border_type(BorderType::Rounded),
            );

            f.render_widget(summary, chunks[0]);

            let items = snapshots.iter().map(|snapshot| {
                let [pid, rest @ ..] = columns(snapshot);
                let pid = Cell::from(pid).style(Style::default().add_modifier(Modifier::BOLD));
                Row::new(std::iter::once(pid).chain(rest.map(Cell::from)))
            });

            let table = Table::new(items)
                .header(Row::new(HEADERS).style(Style::default().add_modifier(Modifier::BOLD)))
                .widths(&[
                    Constraint::Length(5),
                    Constraint::Length(8),
                    Constraint::Length(11),
                    Constraint::Length(4),
                    Constraint::Length(9),
                    Constraint::Length(9),
                    Constraint::Length(8),
                    Constraint::Length(11),
                ])
                .block(Block::default().title(title).borders(Borders::ALL))
                .style(Style::default().fg(Color::LightGreen))
                .column_spacing(1);

            f.render_widget(table, chunks[1]);
        })?;
        Ok(())
    }
}

impl SnapshotSink for DisplayTerminal {
    fn show(&mut self, snapshots: &[ProcessSnapshot]) {
        if let Err(err) = self.draw(snapshots) {
            error!("failed to draw frame: {err}");
        }
    }
}

/// Plain console table, redrawn in place over the previous frame.
pub struct PlainTable<W> {
    out: W,
    lines: u16,
}

impl PlainTable<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PlainTable<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write(&mut self, snapshots: &[ProcessSnapshot]) -> Result<(), io::Error> {
        if self.lines > 0 {
            queue!(self.out, MoveUp(self.lines), Clear(ClearType::FromCursorDown))?;
        }

        let [pid, priority, state, core, turn, wait, cpu, remain] = HEADERS;
        writeln!(
            self.out,
            "| {pid:>5} | {priority:>8} | {state:>11} | {core:>4} | {turn:>9} | {wait:>9} | {cpu:>8} | {remain:>11} |"
        )?;
        writeln!(
            self.out,
            "+-------+----------+-------------+------+-----------+-----------+----------+-------------+"
        )?;
        for snapshot in snapshots {
            let [pid, priority, state, core, turn, wait, cpu, remain] = columns(snapshot);
            writeln!(
                self.out,
                "| {pid:>5} | {priority:>8} | {state:>11} | {core:>4} | {turn:>9} | {wait:>9} | {cpu:>8} | {remain:>11} |"
            )?;
        }
        self.out.flush()?;

        self.lines = u16::try_from(snapshots.len() + 2).unwrap_or(u16::MAX);
        Ok(())
    }
}

impl<W: Write> SnapshotSink for PlainTable<W> {
    fn show(&mut self, snapshots: &[ProcessSnapshot]) {
        if let Err(err) = self.write(snapshots) {
            error!("failed to print process table: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pid: u16, state: ProcessState, core: Option<u8>) -> ProcessSnapshot {
        ProcessSnapshot {
            pid,
            priority: 2,
            state,
            core,
            turnaround: Duration::from_millis(1260),
            wait: Duration::from_millis(300),
            cpu: Duration::from_millis(910),
            remaining: Duration::from_millis(49),
        }
    }

    #[test]
    fn plain_table_rows() {
        let mut table = PlainTable::new(Vec::new());
        table
            .write(&[
                snapshot(1, ProcessState::Running, Some(0)),
                snapshot(12, ProcessState::Blocked, None),
            ])
            .unwrap();
        let text = String::from_utf8(table.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[2],
            "|     1 |        2 |     running |    0 |       1.3 |       0.3 |      0.9 |         0.0 |"
        );
        assert_eq!(
            lines[3],
            "|    12 |        2 |         i/o |   -- |       1.3 |       0.3 |      0.9 |         0.0 |"
        );
    }

    #[test]
    fn plain_table_redraws_in_place() {
        let mut table = PlainTable::new(Vec::new());
        table.write(&[snapshot(1, ProcessState::Ready, None)]).unwrap();
        let first = table.out.len();
        table.write(&[snapshot(1, ProcessState::Running, Some(1))]).unwrap();

        // Cursor-up escape for the three lines of the first frame.
        let redraw = String::from_utf8(table.into_inner()[first..].to_vec()).unwrap();
        assert!(redraw.starts_with("\u{1b}[3A"));
    }

    #[test]
    fn closures_are_sinks() {
        let mut count = 0;
        let mut sink = |snapshots: &[ProcessSnapshot]| count += snapshots.len();
        sink.show(&[snapshot(1, ProcessState::Ready, None)]);
        sink.show(&[]);
        assert_eq!(count, 1);
    }
}
