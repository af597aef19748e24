//! C++14
//!
//! Vocabulary, lexical table and rule catalog for the CPP14 grammar.

use crate::semhl::grammatical::RuleCatalog;
use crate::semhl::hcode::HCode;
use crate::semhl::lexical::LexicalTable;
use crate::semhl::overrides::{OverrideSet, Scan};
use crate::semhl::syntax::{NodeRef, RuleId, TokenKind};
use once_cell::sync::Lazy;

vocabulary! {
    /// CPP14 lexer token kinds.
    Token => TokenKind {
        IntegerLiteral, CharacterLiteral, FloatingLiteral, StringLiteral, BooleanLiteral,
        PointerLiteral, UserDefinedLiteral, MultiLineMacro, Directive,
        Alignas, Alignof, Asm, Auto, Bool, Break, Case, Catch, Char, Char16, Char32, Class,
        Const, Constexpr, ConstCast, Continue, Decltype, Default, Delete, Do, Double,
        DynamicCast, Else, Enum, Explicit, Export, Extern, False, Final, Float, For, Friend,
        Goto, If, Inline, Int, Long, Mutable, Namespace, New, Noexcept, Nullptr, Operator,
        Override, Private, Protected, Public, Register, ReinterpretCast, Return, Short,
        Signed, Sizeof, Static, StaticAssert, StaticCast, Struct, Switch, Template, This,
        ThreadLocal, Throw, True, Try, Typedef, Typeid, Typename, Union, Unsigned, Using,
        Virtual, Void, Volatile, Wchar, While,
        LeftParen, RightParen, LeftBracket, RightBracket, LeftBrace, RightBrace,
        Plus, Minus, Star, Div, Mod, Caret, And, Or, Tilde, Not, Assign, Less, Greater,
        PlusAssign, MinusAssign, StarAssign, DivAssign, ModAssign, XorAssign, AndAssign,
        OrAssign, LeftShiftAssign, RightShiftAssign, Equal, NotEqual, LessEqual,
        GreaterEqual, AndAnd, OrOr, PlusPlus, MinusMinus, Comma, ArrowStar, Arrow, Question,
        Colon, Doublecolon, Semi, Dot, DotStar, Ellipsis,
        Identifier, DecimalLiteral, OctalLiteral, HexadecimalLiteral, BinaryLiteral,
        Integersuffix, UserDefinedIntegerLiteral, UserDefinedFloatingLiteral,
        UserDefinedStringLiteral, UserDefinedCharacterLiteral,
        Whitespace, Newline, BlockComment, LineComment,
    }
}

vocabulary! {
    /// CPP14 parser productions.
    Rule => RuleId {
        TranslationUnit, PrimaryExpression, IdExpression, UnqualifiedId, QualifiedId,
        NestedNameSpecifier, PostfixExpression, ExpressionList, UnaryExpression,
        AssignmentExpression, Expression, Statement, ExpressionStatement, CompoundStatement,
        DeclarationStatement, Declarationseq, Declaration, BlockDeclaration,
        SimpleDeclaration, DeclSpecifier, DeclSpecifierSeq, TypeSpecifier,
        TrailingTypeSpecifier, SimpleTypeSpecifier, TheTypeName, EnumSpecifier, EnumHead,
        NamespaceDefinition, InitDeclaratorList, InitDeclarator, Declarator,
        PointerDeclarator, NoPointerDeclarator, ParametersAndQualifiers, Declaratorid,
        TheTypeId, ParameterDeclarationClause, ParameterDeclaration, FunctionDefinition,
        FunctionBody, Initializer, BraceOrEqualInitializer, InitializerClause, ClassName,
        ClassSpecifier, ClassHead, ClassHeadName, ClassKey, MemberSpecification,
        Memberdeclaration, MemberDeclaratorList, MemberDeclarator, BaseClause,
        BaseSpecifierList, BaseSpecifier, ClassOrDeclType, BaseTypeSpecifier,
        TemplateDeclaration, TemplateparameterList, TemplateParameter, TypeParameter,
        SimpleTemplateId, TemplateId, TemplateName, TemplateArgumentList, TemplateArgument,
        ExplicitSpecialization, Literal,
    }
}

/// Single-child wrappers unwound while looking for a templated callee.
const MAX_UNWRAP: usize = 10;

const ACCESSORS: [&str; 2] = [".", "->"];

pub static LEXICAL: Lazy<LexicalTable> = Lazy::new(|| {
    use Token::*;
    LexicalTable::builder()
        .bucket(
            HCode::Keyword,
            [
                Alignas, Alignof, Asm, Auto, Bool, Break, Case, Catch, Char, Char16, Char32,
                Class, Const, Constexpr, ConstCast, Continue, Decltype, Default, Delete, Do,
                Double, DynamicCast, Else, Enum, Explicit, Export, Extern, False, Final,
                Float, For, Friend, Goto, If, Inline, Int, Long, Mutable, Namespace, New,
                Noexcept, Operator, Override, Private, Protected, Public, Register,
                ReinterpretCast, Return, Short, Signed, Sizeof, Static, StaticAssert,
                StaticCast, Struct, Switch, Template, This, ThreadLocal, Throw, True, Try,
                Typedef, Typeid, Typename, Union, Unsigned, Using, Virtual, Void, Volatile,
                Wchar, While, Question, Ellipsis, Integersuffix, Whitespace, Newline,
            ],
        )
        .bucket(
            HCode::Literal,
            [
                IntegerLiteral,
                BooleanLiteral,
                PointerLiteral,
                FloatingLiteral,
                Nullptr,
                UserDefinedLiteral,
                UserDefinedFloatingLiteral,
                UserDefinedIntegerLiteral,
                DecimalLiteral,
                OctalLiteral,
                HexadecimalLiteral,
                BinaryLiteral,
            ],
        )
        .bucket(
            HCode::CharStringLiteral,
            [
                StringLiteral,
                CharacterLiteral,
                UserDefinedCharacterLiteral,
                UserDefinedStringLiteral,
            ],
        )
        .bucket(
            HCode::Comment,
            [LineComment, BlockComment, Directive, MultiLineMacro],
        )
        .build()
});

fn parent_is(node: NodeRef<'_>, rule: Rule) -> bool {
    node.parent().is_some_and(|parent| parent.is_rule(rule))
}

pub struct CppRules;

impl RuleCatalog for CppRules {
    fn name(&self) -> &'static str {
        "cpp"
    }

    fn on_exit(&self, node: NodeRef<'_>, overrides: &mut OverrideSet) {
        let Some(rule) = node.rule().and_then(Rule::from_id) else {
            return;
        };
        match rule {
            Rule::ClassName => class_name(node, overrides),
            Rule::Memberdeclaration => member_declaration(node, overrides),
            Rule::SimpleDeclaration => simple_declaration(node, overrides),
            Rule::NoPointerDeclarator => {
                if node.has_child_of(Rule::ParametersAndQualifiers) {
                    Scan::production(Rule::NoPointerDeclarator).assign(
                        node,
                        overrides,
                        rule,
                        HCode::FunctionDeclarator,
                    );
                }
            }
            Rule::PostfixExpression => postfix_expression(node, overrides),
            Rule::BaseTypeSpecifier => {
                Scan::production(Rule::ClassOrDeclType).assign(
                    node,
                    overrides,
                    rule,
                    HCode::TypeIdentifier,
                );
            }
            Rule::TypeParameter => {
                if parent_is(node, Rule::TemplateParameter) {
                    Scan::terminal(Token::Identifier)
                        .reversed()
                        .first_only()
                        .assign(node, overrides, rule, HCode::TypeIdentifier);
                }
            }
            Rule::TemplateName => {
                Scan::terminal(Token::Identifier).assign(
                    node,
                    overrides,
                    rule,
                    HCode::TypeIdentifier,
                );
            }
            Rule::EnumHead => {
                Scan::terminal(Token::Identifier)
                    .reversed()
                    .first_only()
                    .assign(node, overrides, rule, HCode::ClassDeclarator);
            }
            Rule::QualifiedId => qualified_id(node, overrides),
            _ => {}
        }
    }
}

/// Class names are declarators inside a class head and types elsewhere, except as
/// the leading segment of a nested name.
fn class_name(node: NodeRef<'_>, overrides: &mut OverrideSet) {
    let hcode = if parent_is(node, Rule::ClassHeadName) {
        HCode::ClassDeclarator
    } else if parent_is(node, Rule::TheTypeName)
        && !node
            .parent()
            .and_then(|parent| parent.parent())
            .is_some_and(|grand| grand.is_rule(Rule::NestedNameSpecifier))
    {
        HCode::TypeIdentifier
    } else {
        return;
    };
    Scan::terminal(Token::Identifier)
        .first_only()
        .assign(node, overrides, Rule::ClassName, hcode);
}

fn member_declaration(node: NodeRef<'_>, overrides: &mut OverrideSet) {
    let Some(list) = node.child(1).filter(|c| c.is_rule(Rule::MemberDeclaratorList)) else {
        return;
    };
    for declarator in list.children_of(Rule::MemberDeclarator) {
        Scan::production(Rule::Declarator).assign(
            declarator,
            overrides,
            Rule::Memberdeclaration,
            HCode::VariableDeclarator,
        );
    }
}

/// Block-scope declarations only; namespace-scope ones sit directly in a declaration.
fn simple_declaration(node: NodeRef<'_>, overrides: &mut OverrideSet) {
    let at_namespace_scope = node
        .parent()
        .and_then(|parent| parent.parent())
        .is_some_and(|grand| grand.is_rule(Rule::Declaration));
    if at_namespace_scope || !node.has_child_of(Rule::DeclSpecifierSeq) {
        return;
    }
    let Some(list) = node.child(1).filter(|c| c.is_rule(Rule::InitDeclaratorList)) else {
        return;
    };
    for declarator in list.children_of(Rule::InitDeclarator) {
        Scan::production(Rule::Declarator).assign(
            declarator,
            overrides,
            Rule::SimpleDeclaration,
            HCode::VariableDeclarator,
        );
    }
}

fn postfix_expression(node: NodeRef<'_>, overrides: &mut OverrideSet) {
    let origin = Rule::PostfixExpression;

    // a.b / a->b directly under a unary expression
    if parent_is(node, Rule::UnaryExpression)
        && node.child(1).is_some_and(|c| c.is_text_any(&ACCESSORS))
    {
        Scan::production(Rule::IdExpression).assign(
            node,
            overrides,
            origin,
            HCode::FieldIdentifier,
        );
    }

    let Some(parent) = node.parent().filter(|p| p.is_rule(Rule::PostfixExpression)) else {
        return;
    };
    if parent.child_count() < 3 {
        return;
    }
    let Some(operator) = parent.child(1).filter(|c| c.is_terminal()) else {
        return;
    };

    if operator.is_text_any(&["("]) {
        if let Some(template) = templated_callee(node) {
            Scan::production(Rule::TemplateName).assign(
                template,
                overrides,
                origin,
                HCode::FunctionIdentifier,
            );
        } else {
            Scan::production(Rule::PrimaryExpression).assign(
                node,
                overrides,
                origin,
                HCode::FunctionIdentifier,
            );
            Scan::production(Rule::IdExpression).assign(
                node,
                overrides,
                origin,
                HCode::FunctionIdentifier,
            );
        }
    } else if operator.is_text_any(&ACCESSORS) {
        Scan::production(Rule::IdExpression).assign(
            node,
            overrides,
            origin,
            HCode::FieldIdentifier,
        );
    }
}

/// Follows first children looking for a `simpleTemplateId`, giving up after
/// [`MAX_UNWRAP`] levels or at the first terminal.
fn templated_callee(node: NodeRef<'_>) -> Option<NodeRef<'_>> {
    let mut current = node.child(0);
    for _ in 0..MAX_UNWRAP {
        let candidate = current.filter(|c| !c.is_terminal())?;
        if candidate.is_rule(Rule::SimpleTemplateId) {
            return Some(candidate);
        }
        current = candidate.child(0);
    }
    None
}

fn qualified_id(node: NodeRef<'_>, overrides: &mut OverrideSet) {
    let scoped = node
        .child(0)
        .filter(|c| c.is_rule(Rule::NestedNameSpecifier))
        .and_then(|nested| nested.child(1))
        .is_some_and(|c| c.is_text_any(&["::"]));
    if scoped {
        Scan::production(Rule::UnqualifiedId).assign(
            node,
            overrides,
            Rule::QualifiedId,
            HCode::FieldIdentifier,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semhl::grammatical::{GrammaticalOverrideEngine, OverrideEngine};
    use crate::semhl::syntax::{ParseTree, TreeBuilder};

    fn overrides_of(tree: &ParseTree) -> Vec<(usize, HCode)> {
        let mut engine = OverrideEngine::new(CppRules);
        engine
            .walk(tree)
            .sorted()
            .into_iter()
            .map(|o| (o.start, o.hcode))
            .collect()
    }

    /// `foo(x)` as a call expression statement.
    fn call() -> ParseTree {
        let mut b = TreeBuilder::new("foo(x);");
        b.start(Rule::ExpressionStatement)
            .start(Rule::PostfixExpression)
            .start(Rule::PostfixExpression)
            .start(Rule::PrimaryExpression)
            .start(Rule::IdExpression)
            .start(Rule::UnqualifiedId)
            .token(Token::Identifier, "foo")
            .finish_node()
            .finish_node()
            .finish_node()
            .finish_node()
            .token(Token::LeftParen, "(")
            .start(Rule::ExpressionList)
            .token(Token::Identifier, "x")
            .finish_node()
            .token(Token::RightParen, ")")
            .finish_node()
            .token(Token::Semi, ";")
            .finish_node();
        b.finish().unwrap()
    }

    #[test]
    fn test_call_target_is_function_identifier() {
        assert_eq!(overrides_of(&call()), vec![(0, HCode::FunctionIdentifier)]);
    }

    #[test]
    fn test_member_access_is_field_identifier() {
        let mut b = TreeBuilder::new("p->len");
        b.start(Rule::UnaryExpression)
            .start(Rule::PostfixExpression)
            .start(Rule::PostfixExpression)
            .start(Rule::PrimaryExpression)
            .token(Token::Identifier, "p")
            .finish_node()
            .finish_node()
            .token(Token::Arrow, "->")
            .start(Rule::IdExpression)
            .start(Rule::UnqualifiedId)
            .token(Token::Identifier, "len")
            .finish_node()
            .finish_node()
            .finish_node()
            .finish_node();
        let tree = b.finish().unwrap();
        assert_eq!(overrides_of(&tree), vec![(3, HCode::FieldIdentifier)]);
    }

    #[test]
    fn test_templated_call_marks_template_name() {
        let mut b = TreeBuilder::new("make<T>()");
        b.start(Rule::PostfixExpression)
            .start(Rule::PostfixExpression)
            .start(Rule::PrimaryExpression)
            .start(Rule::IdExpression)
            .start(Rule::UnqualifiedId)
            .start(Rule::TemplateId)
            .start(Rule::SimpleTemplateId)
            .start(Rule::TemplateName)
            .token(Token::Identifier, "make")
            .finish_node()
            .token(Token::Less, "<")
            .start(Rule::TemplateArgumentList)
            .token(Token::Identifier, "T")
            .finish_node()
            .token(Token::Greater, ">")
            .finish_node()
            .finish_node()
            .finish_node()
            .finish_node()
            .finish_node()
            .finish_node()
            .token(Token::LeftParen, "(")
            .token(Token::RightParen, ")")
            .finish_node();
        let tree = b.finish().unwrap();
        // the postfix rule runs after templateName and replaces its TYPE_IDENTIFIER
        assert_eq!(overrides_of(&tree), vec![(0, HCode::FunctionIdentifier)]);
    }

    #[test]
    fn test_unwrap_cap_falls_back_to_plain_callee() {
        let mut b = TreeBuilder::new("f()");
        b.start(Rule::PostfixExpression).start(Rule::PostfixExpression);
        for _ in 0..MAX_UNWRAP {
            b.start(Rule::PrimaryExpression);
        }
        b.start(Rule::SimpleTemplateId).token(Token::Identifier, "f").finish_node();
        for _ in 0..MAX_UNWRAP {
            b.finish_node();
        }
        b.finish_node()
            .token(Token::LeftParen, "(")
            .token(Token::RightParen, ")")
            .finish_node();
        let tree = b.finish().unwrap();
        assert_eq!(overrides_of(&tree), vec![(0, HCode::FunctionIdentifier)]);
    }

    #[test]
    fn test_enum_head_marks_last_identifier() {
        let mut b = TreeBuilder::new("enum class ns::Color");
        b.start(Rule::EnumHead)
            .token(Token::Enum, "enum")
            .token(Token::Class, "class")
            .start(Rule::NestedNameSpecifier)
            .token(Token::Identifier, "ns")
            .token(Token::Doublecolon, "::")
            .finish_node()
            .token(Token::Identifier, "Color")
            .finish_node();
        let tree = b.finish().unwrap();
        assert_eq!(overrides_of(&tree), vec![(15, HCode::ClassDeclarator)]);
    }

    #[test]
    fn test_namespace_scope_declarations_are_skipped() {
        let mut b = TreeBuilder::new("int g;");
        b.start(Rule::Declaration)
            .start(Rule::BlockDeclaration)
            .start(Rule::SimpleDeclaration)
            .start(Rule::DeclSpecifierSeq)
            .token(Token::Int, "int")
            .finish_node()
            .start(Rule::InitDeclaratorList)
            .start(Rule::InitDeclarator)
            .start(Rule::Declarator)
            .token(Token::Identifier, "g")
            .finish_node()
            .finish_node()
            .finish_node()
            .token(Token::Semi, ";")
            .finish_node()
            .finish_node()
            .finish_node();
        let tree = b.finish().unwrap();
        assert!(overrides_of(&tree).is_empty());
    }

    #[test]
    fn test_nested_name_class_is_not_a_type() {
        let mut b = TreeBuilder::new("std::string");
        b.start(Rule::SimpleTypeSpecifier)
            .start(Rule::NestedNameSpecifier)
            .start(Rule::TheTypeName)
            .start(Rule::ClassName)
            .token(Token::Identifier, "std")
            .finish_node()
            .finish_node()
            .token(Token::Doublecolon, "::")
            .finish_node()
            .start(Rule::TheTypeName)
            .start(Rule::ClassName)
            .token(Token::Identifier, "string")
            .finish_node()
            .finish_node()
            .finish_node();
        let tree = b.finish().unwrap();
        assert_eq!(overrides_of(&tree), vec![(5, HCode::TypeIdentifier)]);
    }

    #[test]
    fn test_lexical_quirks_are_kept() {
        assert_eq!(LEXICAL.lookup(Token::Whitespace.into()), HCode::Keyword);
        assert_eq!(LEXICAL.lookup(Token::Nullptr.into()), HCode::Literal);
        assert_eq!(LEXICAL.lookup(Token::Directive.into()), HCode::Comment);
        assert_eq!(LEXICAL.lookup(Token::Identifier.into()), HCode::Any);
    }
}
