//! Menu prompts and record rendering.
//!
//! Every action opens its own session and releases it before control
//! returns to the main menu. Failures are printed, not propagated; only I/O
//! errors on the console itself end the program.

use empdir_core::{
    DirectoryService, Employee, EmployeeDraft, RepoError, SearchField, SortKey,
};
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};

const RULE: &str = "------------------------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Insert,
    List,
    Search,
    Quit,
}

/// Failure inside one menu action.
#[derive(Debug)]
enum ActionError {
    Io(io::Error),
    Repo(RepoError),
    /// Input the prompt could not accept; the action is abandoned.
    Input(String),
}

impl Display for ActionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Input(message) => write!(f, "{message}"),
        }
    }
}

impl From<io::Error> for ActionError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RepoError> for ActionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Shows the main menu until a valid choice is read. EOF quits.
    pub fn main_menu(&mut self) -> io::Result<MenuChoice> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "1. Insert employee")?;
            writeln!(self.output, "2. List employees")?;
            writeln!(self.output, "3. Search employees")?;
            let Some(line) = self.prompt(">> Select (1~3, -1 to quit): ")? else {
                return Ok(MenuChoice::Quit);
            };
            match line.as_str() {
                "1" => return Ok(MenuChoice::Insert),
                "2" => return Ok(MenuChoice::List),
                "3" => return Ok(MenuChoice::Search),
                "-1" => return Ok(MenuChoice::Quit),
                other => writeln!(self.output, "unknown option `{other}`")?,
            }
        }
    }

    pub fn insert_employee(&mut self, service: &mut DirectoryService) -> io::Result<()> {
        if let Err(err) = service.connect() {
            return self.report(&err);
        }
        let outcome = self.insert_flow(service);
        let closed = service.close();

        self.finish(outcome)?;
        if let Err(err) = closed {
            self.report(&err)?;
        }
        Ok(())
    }

    pub fn list_employees(&mut self, service: &mut DirectoryService) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "1. Sort by identifier")?;
        writeln!(self.output, "2. Sort by name")?;
        writeln!(self.output, "3. Sort by department")?;
        writeln!(self.output, "4. Sort by rank")?;
        writeln!(self.output, "5. Sort by pay (descending)")?;
        let sort = match self.prompt(">> Select (1~5, -1 to cancel): ")?.as_deref() {
            Some("1") => SortKey::Identifier,
            Some("2") => SortKey::Name,
            Some("3") => SortKey::Department,
            Some("4") => SortKey::Rank,
            Some("5") => SortKey::PayDescending,
            Some("-1") | None => return Ok(()),
            Some(other) => return self.report(&format!("unknown option `{other}`")),
        };

        match service.with_session(|repo| {
            Ok((repo.count_employees()?, repo.list_employees(sort)?))
        }) {
            Ok((total, employees)) => {
                writeln!(self.output)?;
                writeln!(self.output, "Total employees: {total}")?;
                self.render(&employees)
            }
            Err(err) => self.report(&err),
        }
    }

    pub fn search_employees(&mut self, service: &mut DirectoryService) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "1. Search by identifier")?;
        writeln!(self.output, "2. Search by name")?;
        writeln!(self.output, "3. Search by department")?;
        writeln!(self.output, "4. Search by rank")?;
        let field = match self.prompt(">> Select (1~4, -1 to cancel): ")?.as_deref() {
            Some("1") => SearchField::Identifier,
            Some("2") => SearchField::Name,
            Some("3") => SearchField::Department,
            Some("4") => SearchField::Rank,
            Some("-1") | None => return Ok(()),
            Some(other) => return self.report(&format!("unknown option `{other}`")),
        };
        let Some(value) = self.prompt(&format!("{field} to search for: "))? else {
            return Ok(());
        };

        match service.with_session(|repo| {
            Ok((
                repo.count_by_field(field, &value)?,
                repo.search_by_field(field, &value)?,
            ))
        }) {
            Ok((0, _)) => {
                writeln!(self.output, "No matching employees.")?;
                Ok(())
            }
            Ok((matched, employees)) => {
                writeln!(self.output)?;
                writeln!(self.output, "Matching employees: {matched}")?;
                self.render(&employees)
            }
            Err(err) => self.report(&err),
        }
    }

    fn insert_flow(&mut self, service: &DirectoryService) -> Result<(), ActionError> {
        let options = service.insert_form_options()?;

        writeln!(self.output, "Insert employee {RULE}")?;
        let name = self.require("Name: ")?;
        let ssn = self.require("SSN (yymmdd-nnnnnnn): ")?;
        let hire_date = self.require("Hire date (yyyy-mm-dd): ")?;
        let city = self.require(&format!("City ({}): ", options.cities.join("/")))?;
        let phone = self.prompt("Phone (blank for none): ")?;
        let department = self.require(&format!(
            "Department ({}): ",
            options.departments.join("/")
        ))?;
        let rank = self.require(&format!("Rank ({}): ", options.ranks.join("/")))?;
        let floor = service.lookup_minimum_pay_for_rank(&rank)?;
        let basic_pay = self.require_amount(&format!("Basic pay (at least {floor}): "))?;
        let allowance = self.require_amount("Allowance: ")?;

        let draft = EmployeeDraft {
            name,
            ssn,
            hire_date,
            city,
            phone,
            department,
            rank,
            basic_pay,
            allowance,
        };
        if service.insert_employee(&draft)? > 0 {
            writeln!(self.output, "Employee saved.")?;
        }
        writeln!(self.output, "{RULE} Insert employee")?;
        Ok(())
    }

    fn finish(&mut self, outcome: Result<(), ActionError>) -> io::Result<()> {
        match outcome {
            Ok(()) => Ok(()),
            Err(ActionError::Io(err)) => Err(err),
            Err(other) => self.report(&other),
        }
    }

    fn render(&mut self, employees: &[Employee]) -> io::Result<()> {
        writeln!(
            self.output,
            "{:>5} {:<10} {:<14} {:<10} {:<10} {:<13} {:<15} {:<17} {:>9} {:>9} {:>10}",
            "ID", "Name", "SSN", "Hired", "City", "Phone", "Department", "Rank", "Basic",
            "Allowance", "Pay"
        )?;
        for e in employees {
            writeln!(
                self.output,
                "{:>5} {:<10} {:<14} {:<10} {:<10} {:<13} {:<15} {:<17} {:>9} {:>9} {:>10}",
                e.id,
                e.name,
                e.ssn,
                e.hire_date,
                e.city,
                e.phone,
                e.department,
                e.rank,
                e.basic_pay,
                e.allowance,
                e.pay
            )?;
        }
        Ok(())
    }

    fn report(&mut self, err: &dyn Display) -> io::Result<()> {
        log::warn!("event=action_failed module=cli status=error error={err}");
        writeln!(self.output, "error: {err}")
    }

    /// Prints `label` and reads one trimmed line; `None` on EOF.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn require(&mut self, label: &str) -> Result<String, ActionError> {
        self.prompt(label)?
            .ok_or_else(|| ActionError::Input("input ended early".to_string()))
    }

    fn require_amount(&mut self, label: &str) -> Result<i64, ActionError> {
        let raw = self.require(label)?;
        raw.parse::<i64>()
            .map_err(|_| ActionError::Input(format!("`{raw}` is not a whole number")))
    }
}

#[cfg(test)]
mod tests {
    use super::{Console, MenuChoice};
    use empdir_core::{DbConfig, DirectoryService};
    use std::io::Cursor;

    fn run<F>(script: &str, action: F) -> String
    where
        F: FnOnce(&mut Console<Cursor<Vec<u8>>, &mut Vec<u8>>),
    {
        let mut output = Vec::new();
        {
            let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), &mut output);
            action(&mut console);
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn main_menu_skips_unknown_options_and_quits_on_eof() {
        let mut choices = Vec::new();
        run("9\n2\n", |console| {
            choices.push(console.main_menu().unwrap());
            choices.push(console.main_menu().unwrap());
        });
        assert_eq!(choices, vec![MenuChoice::List, MenuChoice::Quit]);
    }

    #[test]
    fn insert_then_search_prints_the_new_employee() {
        let dir = tempfile::tempdir().unwrap();
        let mut service = DirectoryService::new(DbConfig::file(dir.path().join("directory.db")));

        let inserted = run(
            "Kim\n960608-2234567\n2019-06-08\nSeoul\n\nDev\nStaff\n3000000\n500000\n",
            |console| console.insert_employee(&mut service).unwrap(),
        );
        assert!(inserted.contains("Employee saved."));
        assert!(inserted.contains("at least 1800000"));
        assert!(!service.is_connected());

        let searched = run("2\nKim\n", |console| {
            console.search_employees(&mut service).unwrap()
        });
        assert!(searched.contains("Matching employees: 1"));
        assert!(searched.contains("(none)"));
        assert!(!service.is_connected());
    }

    #[test]
    fn failed_insert_is_reported_and_releases_the_session() {
        let mut service = DirectoryService::new(DbConfig::in_memory());

        let output = run(
            "Kim\n960608-2234567\n2019-06-08\nAtlantis\n\nDev\nStaff\n3000000\n500000\n",
            |console| console.insert_employee(&mut service).unwrap(),
        );
        assert!(output.contains("error: unknown city name `Atlantis`"));
        assert!(!service.is_connected());
    }
}
