//! The [`Engine`] pipeline and its error type.

use rill_eval::{EvalError, EvalResult, Interpreter, Value};
use rill_lexer::Lexer;
use rill_parser::Parser;
use rill_types::ast::Block;
use rill_types::{ParseError, SourceFile};

use crate::EngineConfig;

/// Any failure of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Lexing or parsing failed; nothing was executed.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// The program threw an uncaught exception.
    #[error("{0}")]
    Runtime(#[from] EvalError),
    #[error("invalid engine config: {0}")]
    Config(#[from] serde_json::Error),
}

impl EngineError {
    /// The uncaught exception, if this is a runtime failure.
    pub fn thrown(&self) -> Option<&rill_eval::Thrown> {
        match self {
            EngineError::Runtime(err) => err.thrown(),
            _ => None,
        }
    }
}

/// A configured interpreter plus the front end that feeds it.
pub struct Engine {
    config: EngineConfig,
    interpreter: Interpreter,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let interpreter = Interpreter::with_options(config.interpreter_options());
        Self {
            config,
            interpreter,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interpreter
    }

    /// Lex and parse `source` without running it.
    pub fn parse(&self, source: &str) -> Result<Block, ParseError> {
        let file = SourceFile::new(self.config.source_name.as_str(), source);
        let tokens = Lexer::new(&file).lex()?;
        Parser::new(tokens, &file).parse()
    }

    /// Run `source` and return the value of its last value-producing
    /// statement. Bindings persist into later calls.
    #[tracing::instrument(level = "debug", skip_all, fields(source = %self.config.source_name))]
    pub fn eval(&mut self, source: &str) -> Result<Value, EngineError> {
        let program = self.parse(source)?;
        Ok(self.interpreter.interpret(&program)?)
    }

    /// Read a global binding.
    pub fn get_global(&self, name: &str) -> Result<Value, EngineError> {
        Ok(self.interpreter.get_global_value(name)?)
    }

    /// Bind a host function as a global.
    pub fn define_native(
        &mut self,
        name: &str,
        call: impl Fn(&mut Interpreter, Value, Vec<Value>) -> EvalResult<Value> + 'static,
    ) {
        self.interpreter.define_native(name, call);
    }
}

/// Evaluate `source` in a fresh default engine.
pub fn eval(source: &str) -> Result<Value, EngineError> {
    Engine::new().eval(source)
}
