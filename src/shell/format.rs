// src/shell/format.rs
//
// `format` wizard: disk -> (partition, quick?) -> format
// - a disk with no partitions gets one spanning the whole disk, then partition 0 is formatted
// - indices are only parsed here; range checks belong to the storage collaborator

use crate::error::CommandError;
use crate::hal::storage::DiskView;
use crate::hal::Machine;
use crate::logging::Logger;
use crate::shell::{CommandInvocation, Ctx, Flow};

pub struct DiskFormatWizard<'a> {
    filesystem: &'a str,
    logger: Logger,
}

impl<'a> DiskFormatWizard<'a> {
    pub fn new(filesystem: &'a str, logger: Logger) -> Self {
        Self { filesystem, logger }
    }

    fn ask(m: &mut Machine, question: &str) -> Result<String, CommandError> {
        m.console.write(question)?;
        m.console
            .read_line()?
            .map(|answer| answer.trim().to_string())
            .ok_or(CommandError::InputClosed)
    }

    fn ask_index(m: &mut Machine, question: &str) -> Result<usize, CommandError> {
        let answer = Self::ask(m, question)?;
        answer
            .parse()
            .map_err(|_| CommandError::InvalidSelection(answer))
    }

    pub fn run(&self, m: &mut Machine) -> Result<(), CommandError> {
        let view = DiskView::read(m.storage.as_ref())?;
        if view.is_empty() {
            return Err(CommandError::NoDisks);
        }

        for index in 0..view.len() {
            m.console.write_line(&format!("[== Disk #{index} ==]"))?;
            let info = m.storage.describe_disk(index)?;
            m.console.write(&info)?;
            m.console.write_line("")?;
        }

        let disk = Self::ask_index(
            m,
            &format!("Choose a disk to format (0-{}) >> ", view.len() - 1),
        )?;
        let target = view.get(disk)?;

        let (partition, quick) = if target.partitions.is_empty() {
            m.console
                .write_line("This disk does not have any partitions, so one will be created.")?;
            self.logger.info(m, &format!("Creating partition on disk #{disk}..."))?;
            m.storage.create_partition(disk, target.size_bytes)?;
            self.logger.info(m, "Partition created.")?;
            (0, false)
        } else {
            let partition = Self::ask_index(
                m,
                &format!(
                    "Choose a partition to format (0-{}) >> ",
                    target.partitions.len() - 1
                ),
            )?;
            let quick = Self::ask(m, "Quick format? (y/N) >> ")?.eq_ignore_ascii_case("y");
            (partition, quick)
        };

        self.logger.info(
            m,
            &format!("Formatting disk #{disk} (partition #{partition}, quick format: {quick})..."),
        )?;
        m.storage
            .format_partition(disk, partition, self.filesystem, quick)?;
        self.logger.info(
            m,
            "Formatting complete, restart the server for the changes to take effect.",
        )?;
        Ok(())
    }
}

pub fn run(ctx: &mut Ctx<'_>, _inv: &CommandInvocation) -> Result<Flow, CommandError> {
    DiskFormatWizard::new(&ctx.config.storage.filesystem, ctx.logger).run(ctx.m)?;
    Ok(Flow::Continue)
}
