//! Test fixtures
//!
//! Grammar adapters live outside this crate, so tests drive the engine with hand-built
//! parse trees shaped like the ones the real grammars produce. The fixtures here are
//! shared between unit tests, integration tests and the evaluation layer's tests.
//!
//! [`FixtureParser`] stands in for a grammar adapter: it answers with the fixture
//! registered for a source text and fails for anything else.

use super::annotation::Heta;
use super::hcode::HCode;
use super::languages::cpp::{Rule, Token};
use super::syntax::{BuildError, ParseFailure, ParseTree, SourceParser, TreeBuilder};

pub const CPP_INT_DECLARATION: &str = "int x = 1;";

pub const CPP_CLASS_SPECIALIZATION: &str = "template<> class Foo<int> {};";

/// `int x = 1;` as a block-scope statement.
pub fn cpp_int_declaration() -> Result<ParseTree, BuildError> {
    let mut b = TreeBuilder::new(CPP_INT_DECLARATION);
    b.start(Rule::Statement)
        .start(Rule::DeclarationStatement)
        .start(Rule::BlockDeclaration)
        .start(Rule::SimpleDeclaration)
        .start(Rule::DeclSpecifierSeq)
        .start(Rule::DeclSpecifier)
        .start(Rule::TypeSpecifier)
        .start(Rule::TrailingTypeSpecifier)
        .start(Rule::SimpleTypeSpecifier)
        .token(Token::Int, "int")
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .start(Rule::InitDeclaratorList)
        .start(Rule::InitDeclarator)
        .start(Rule::Declarator)
        .start(Rule::PointerDeclarator)
        .start(Rule::NoPointerDeclarator)
        .start(Rule::Declaratorid)
        .start(Rule::IdExpression)
        .start(Rule::UnqualifiedId)
        .token(Token::Identifier, "x")
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .start(Rule::Initializer)
        .start(Rule::BraceOrEqualInitializer)
        .token(Token::Assign, "=")
        .start(Rule::InitializerClause)
        .start(Rule::Literal)
        .token(Token::IntegerLiteral, "1")
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .token(Token::Semi, ";")
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node();
    b.finish()
}

/// An explicit class template specialization. The class name and its template name
/// start at the same offset, so the class declarator must win over the template type.
pub fn cpp_class_specialization() -> Result<ParseTree, BuildError> {
    let mut b = TreeBuilder::new(CPP_CLASS_SPECIALIZATION);
    b.start(Rule::TranslationUnit)
        .start(Rule::Declarationseq)
        .start(Rule::Declaration)
        .start(Rule::ExplicitSpecialization)
        .token(Token::Template, "template")
        .token(Token::Less, "<")
        .token(Token::Greater, ">")
        .start(Rule::Declaration)
        .start(Rule::BlockDeclaration)
        .start(Rule::SimpleDeclaration)
        .start(Rule::DeclSpecifierSeq)
        .start(Rule::DeclSpecifier)
        .start(Rule::TypeSpecifier)
        .start(Rule::ClassSpecifier)
        .start(Rule::ClassHead)
        .start(Rule::ClassKey)
        .token(Token::Class, "class")
        .finish_node()
        .start(Rule::ClassHeadName)
        .start(Rule::ClassName)
        .start(Rule::SimpleTemplateId)
        .start(Rule::TemplateName)
        .token(Token::Identifier, "Foo")
        .finish_node()
        .token(Token::Less, "<")
        .start(Rule::TemplateArgumentList)
        .start(Rule::TemplateArgument)
        .start(Rule::TheTypeId)
        .token(Token::Int, "int")
        .finish_node()
        .finish_node()
        .finish_node()
        .token(Token::Greater, ">")
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .token(Token::LeftBrace, "{")
        .token(Token::RightBrace, "}")
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .token(Token::Semi, ";")
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node()
        .finish_node();
    b.finish()
}

type Fixture = fn() -> Result<ParseTree, BuildError>;

/// Parses the sources it has fixtures for.
pub struct FixtureParser {
    fixtures: Vec<(&'static str, Fixture)>,
}

impl FixtureParser {
    pub fn new() -> Self {
        Self {
            fixtures: Vec::new(),
        }
    }

    /// Every C++ fixture in this module.
    pub fn cpp() -> Self {
        Self::new()
            .with(CPP_INT_DECLARATION, cpp_int_declaration)
            .with(CPP_CLASS_SPECIALIZATION, cpp_class_specialization)
    }

    pub fn with(mut self, source: &'static str, fixture: Fixture) -> Self {
        self.fixtures.push((source, fixture));
        self
    }
}

impl Default for FixtureParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for FixtureParser {
    fn parse(&self, source: &str) -> Result<ParseTree, ParseFailure> {
        let (_, fixture) = self
            .fixtures
            .iter()
            .find(|(known, _)| *known == source)
            .ok_or_else(|| ParseFailure::new("no fixture for source"))?;
        Ok(fixture()?)
    }
}

/// `(text, category)` per token, for compact assertions.
pub fn classified(hetas: &[Heta]) -> Vec<(&str, HCode)> {
    hetas
        .iter()
        .map(|heta| (heta.eta.text.as_str(), heta.hcode))
        .collect()
}
