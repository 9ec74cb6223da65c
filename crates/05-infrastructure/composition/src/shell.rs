//! 交互式命令行适配器
//!
//! [`ShellHandler`] 持有 `"shell"` 扩展点，组件通过 [`ShellCommandExt::shell_command`]
//! 声明命令扩展器。命令名称可以由多个单词组成，执行时按最长单词前缀匹配。

use crate::logger::ComponentLog;
use di_abstractions::{Component, ComponentDefinition, ExtenderDescriptor};
use infrastructure_common::HandlerResult;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// 命令行扩展点名称
pub const SHELL_SLOT: &str = "shell";

/// 命令扩展器的声明配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellCommandConfig {
    /// 命令名称，可包含空格
    pub name: String,
    /// 命令说明
    #[serde(default)]
    pub description: String,
}

/// 一次命令调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellRequest {
    /// 原始输入
    pub line: String,
    /// 匹配到的命令名称
    pub command: String,
    /// 命令名称之后的参数
    pub args: Vec<String>,
}

/// 输出行的样式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Plain,
    Highlight,
    Warn,
    Error,
}

/// 输出行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellLine {
    pub style: LineStyle,
    pub text: String,
}

/// 命令输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellResponse {
    lines: Vec<ShellLine>,
}

impl ShellResponse {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, style: LineStyle, text: impl Into<String>) -> &mut Self {
        self.lines.push(ShellLine {
            style,
            text: text.into(),
        });
        self
    }

    pub fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(LineStyle::Plain, text)
    }

    pub fn highlight(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(LineStyle::Highlight, text)
    }

    pub fn warn(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(LineStyle::Warn, text)
    }

    pub fn error(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(LineStyle::Error, text)
    }

    /// 全部输出行
    pub fn lines(&self) -> &[ShellLine] {
        &self.lines
    }

    /// 输出文本，不含样式
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }

    /// 是否包含错误行
    pub fn has_errors(&self) -> bool {
        self.lines.iter().any(|line| line.style == LineStyle::Error)
    }
}

/// 命令处理函数，扩展器绑定后交给命令行
pub type ShellCommandFn = Arc<dyn Fn(&ShellRequest, &mut ShellResponse) + Send + Sync>;

/// 声明命令扩展器的便捷方法
pub trait ShellCommandExt<T> {
    /// 声明一个命令，`method_name` 标识组件上的处理方法
    fn shell_command<F>(self, method_name: &'static str, name: &str, description: &str, handler: F) -> Self
    where
        F: Fn(&T, &ShellRequest, &mut ShellResponse) + Send + Sync + 'static;
}

impl<T: Component> ShellCommandExt<T> for ComponentDefinition<T> {
    fn shell_command<F>(self, method_name: &'static str, name: &str, description: &str, handler: F) -> Self
    where
        F: Fn(&T, &ShellRequest, &mut ShellResponse) + Send + Sync + 'static,
    {
        let handler = Arc::new(handler);
        self.extender(
            SHELL_SLOT,
            method_name,
            json!({ "name": name, "description": description }),
            move |this: Arc<T>| -> ShellCommandFn {
                let handler = handler.clone();
                Arc::new(move |request: &ShellRequest, response: &mut ShellResponse| {
                    handler(&*this, request, response)
                })
            },
        )
    }
}

#[derive(Clone)]
struct ShellCommand {
    config: ShellCommandConfig,
    component: String,
    method_name: &'static str,
    run: ShellCommandFn,
}

/// 命令行处理器
#[derive(Default)]
pub struct ShellHandler {
    log: ComponentLog<ShellHandler>,
    commands: RwLock<BTreeMap<String, ShellCommand>>,
}

impl ShellHandler {
    fn register_command(&self, extender: &ExtenderDescriptor) -> HandlerResult {
        let config: ShellCommandConfig = extender.config()?;
        let run = extender.callable::<ShellCommandFn>()?.clone();
        self.log.debug(format!(
            "命令已登记: {} ({}.{})",
            config.name, extender.type_name, extender.method_name
        ));

        let command = ShellCommand {
            config: config.clone(),
            component: extender.type_name.clone(),
            method_name: extender.method_name,
            run,
        };
        self.commands.write().insert(normalize(&config.name), command);
        Ok(())
    }

    /// 已登记的命令，按名称排序
    pub fn commands(&self) -> Vec<ShellCommandConfig> {
        self.commands
            .read()
            .values()
            .map(|command| command.config.clone())
            .collect()
    }

    /// 命令由哪个组件方法处理
    pub fn handler_of(&self, name: &str) -> Option<(String, &'static str)> {
        self.commands
            .read()
            .get(&normalize(name))
            .map(|command| (command.component.clone(), command.method_name))
    }

    /// 执行一行输入
    pub fn execute(&self, line: &str) -> ShellResponse {
        let mut response = ShellResponse::new();
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return response;
        }
        if words == ["help"] {
            self.help(&mut response);
            return response;
        }

        let matched = {
            let commands = self.commands.read();
            (1..=words.len()).rev().find_map(|len| {
                let name = words[..len].join(" ");
                commands.get(&name).map(|command| (len, name, command.run.clone()))
            })
        };

        match matched {
            Some((len, command, run)) => {
                let request = ShellRequest {
                    line: line.trim().to_string(),
                    command,
                    args: words[len..].iter().map(|word| word.to_string()).collect(),
                };
                run(&request, &mut response);
            }
            None => {
                response.error(format!("未知命令: {}，输入 help 查看可用命令", line.trim()));
            }
        }
        response
    }

    fn help(&self, response: &mut ShellResponse) {
        response.line("可用命令:");
        response.line("  help\t显示本帮助");
        for config in self.commands() {
            response.line(format!("  {}\t{}", config.name, config.description));
        }
    }

    /// 循环读取输入并执行，遇到 `exit`、`quit` 或输入结束时返回
    pub fn run<R: BufRead, W: Write>(&self, prompt: &str, input: R, mut output: W) -> io::Result<()> {
        write!(output, "{prompt}")?;
        output.flush()?;
        for line in input.lines() {
            let line = line?;
            if matches!(line.trim(), "exit" | "quit") {
                break;
            }
            let response = self.execute(&line);
            for shell_line in response.lines() {
                writeln!(output, "{}", render(shell_line))?;
            }
            write!(output, "{prompt}")?;
            output.flush()?;
        }
        writeln!(output)?;
        Ok(())
    }
}

impl fmt::Debug for ShellHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShellHandler")
            .field("commands", &self.commands.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Component for ShellHandler {
    fn definition() -> ComponentDefinition<Self> {
        ComponentDefinition::new()
            .depends_on("logger", |this: &Self| this.log.slot())
            .init("init", |this: &Self| {
                this.log.debug("Service initialised");
                Ok(())
            })
            .extension_point(SHELL_SLOT, "register_command", Self::register_command)
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn render(line: &ShellLine) -> String {
    match line.style {
        LineStyle::Plain => line.text.clone(),
        LineStyle::Highlight => format!("\x1b[36m{}\x1b[0m", line.text),
        LineStyle::Warn => format!("\x1b[33m{}\x1b[0m", line.text),
        LineStyle::Error => format!("\x1b[31m{}\x1b[0m", line.text),
    }
}
