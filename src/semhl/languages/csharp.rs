//! C#
//!
//! Vocabulary, lexical table and rule catalog for the CSharp grammar. Identifiers are a
//! production here (`identifier`) rather than a bare token, so most rules target it.

use crate::semhl::grammatical::RuleCatalog;
use crate::semhl::hcode::HCode;
use crate::semhl::lexical::LexicalTable;
use crate::semhl::overrides::{OverrideSet, Scan};
use crate::semhl::syntax::{NodeRef, RuleId, TokenKind};
use once_cell::sync::Lazy;

vocabulary! {
    /// CSharp lexer token kinds.
    Token => TokenKind {
        ByteOrderMark, SingleLineDocComment, EmptyDelimitedDocComment, DelimitedDocComment,
        SingleLineComment, DelimitedComment, Whitespaces, Sharp,
        Abstract, Add, Alias, Arglist, As, Ascending, Async, Await, Base, Bool, Break, By,
        Byte, Case, Catch, Char, Checked, Class, Const, Continue, Decimal, Default, Delegate,
        Descending, Do, Double, Dynamic, Else, Enum, Equals, Event, Explicit, Extern, False,
        Finally, Fixed, Float, For, Foreach, From, Get, Goto, Group, If, Implicit, In, Int,
        Interface, Internal, Into, Is, Join, Let, Lock, Long, Nameof, Namespace, New, Null,
        Object, On, Operator, Orderby, Out, Override, Params, Partial, Private, Protected,
        Public, Readonly, Ref, Remove, Return, Sbyte, Sealed, Select, Set, Short, Sizeof,
        Stackalloc, Static, String, Struct, Switch, This, Throw, True, Try, Typeof, Uint,
        Ulong, Unchecked, Unmanaged, Unsafe, Ushort, Using, Var, Virtual, Void, Volatile,
        When, Where, While, Yield,
        Identifier, LiteralAccess, IntegerLiteral, HexIntegerLiteral, BinIntegerLiteral,
        RealLiteral, CharacterLiteral, RegularString, VerbatiumString, InterpolatedRegularStringStart,
        InterpolatedVerbatiumStringStart,
        OpenBrace, CloseBrace, OpenBracket, CloseBracket, OpenParens, CloseParens, Dot,
        Comma, Colon, Semicolon, Plus, Minus, Star, Div, Percent, Amp, BitwiseOr, Caret,
        Bang, Tilde, Assignment, Lt, Gt, Interr, DoubleColon, OpCoalescing, OpInc, OpDec,
        OpAnd, OpOr, OpPtr, OpEq, OpNe, OpLe, OpGe, OpAddAssignment, OpSubAssignment,
        OpMultAssignment, OpDivAssignment, OpModAssignment, OpAndAssignment,
        OpOrAssignment, OpXorAssignment, OpLeftShift, OpLeftShiftAssignment,
        OpCoalescingAssignment, OpRange,
        DoubleCurlyInside, OpenBraceInside, RegularCharInside, VerbatiumDoubleQuoteInside,
        DoubleQuoteInside, RegularStringInside, VerbatiumInsideString, CloseBraceInside,
        FormatString, DirectiveWhitespaces, Digits, Define, Undef, Elif, Endif, Line, Error,
        Warning, Region, Endregion, Pragma, Nullable, DirectiveHidden, ConditionalSymbol,
        DirectiveNewLine, TextNewLine, DirectiveSingleLineComment, DirectiveSrc,
        InterpolationString,
    }
}

vocabulary! {
    /// CSharp parser productions.
    Rule => RuleId {
        CompilationUnit, NamespaceOrTypeName, Type, Identifier, QualifiedIdentifier,
        QualifiedAliasMember, UsingDirective, UsingAliasDirective, NamespaceDeclaration,
        NamespaceBody, NamespaceMemberDeclarations, NamespaceMemberDeclaration,
        TypeDeclaration, ClassDefinition, StructDefinition, InterfaceDefinition,
        EnumDefinition, DelegateDefinition, ClassBody, ClassMemberDeclarations,
        ClassMemberDeclaration, CommonMemberDeclaration, TypedMemberDeclaration,
        MethodDeclaration, MethodMemberName, FieldDeclaration, VariableDeclarators,
        VariableDeclarator, ConstantDeclaration, ConstantDeclarators, ConstantDeclarator,
        LocalVariableDeclaration, LocalVariableDeclarator, FixedPointerDeclarators,
        FixedPointerDeclarator, LetClause, QueryBody, LocalFunctionDeclaration,
        LocalFunctionHeader, ConstructorDeclaration, DestructorDefinition, EventDeclaration,
        MemberName, TypeParameterList, TypeParameter, VariantTypeParameterList,
        VariantTypeParameter, TypeParameterConstraintsClauses, TypeParameterConstraintsClause,
        TypeArgumentList, LabeledStatement, Statement, Block, StatementList,
        EmbeddedStatement, Expression, PrimaryExpression, PrimaryExpressionStart,
        MemberAccess, MethodInvocation, ArgumentList, Argument, FormalParameterList,
        FixedParameter, Literal, ObjectCreationExpression,
    }
}

const SOFT_KEYWORDS: [Token; 28] = [
    Token::Add,
    Token::Alias,
    Token::Arglist,
    Token::Ascending,
    Token::Async,
    Token::Await,
    Token::By,
    Token::Descending,
    Token::Dynamic,
    Token::Equals,
    Token::From,
    Token::Get,
    Token::Group,
    Token::Into,
    Token::Join,
    Token::Let,
    Token::Nameof,
    Token::On,
    Token::Orderby,
    Token::Partial,
    Token::Remove,
    Token::Select,
    Token::Set,
    Token::Unmanaged,
    Token::Var,
    Token::When,
    Token::Where,
    Token::Yield,
];

pub static LEXICAL: Lazy<LexicalTable> = Lazy::new(|| {
    use Token::*;
    LexicalTable::builder()
        .bucket(
            HCode::Keyword,
            [
                Abstract, As, Base, Bool, Break, Byte, Case, Catch, Char, Checked, Class,
                Const, Continue, Decimal, Default, Delegate, Do, Double, Else, Enum, Event,
                Explicit, Extern, False, Finally, Fixed, Float, For, Foreach, Goto, If,
                Implicit, In, Int, Interface, Internal, Is, Lock, Long, Namespace, New,
                Object, Operator, Out, Override, Params, Private, Protected, Public,
                Readonly, Ref, Return, Sbyte, Sealed, Short, Sizeof, Stackalloc, Static,
                String, Struct, Switch, This, Throw, Try, Typeof, Uint, Ulong, Unchecked,
                Unsafe, Ushort, Using, Virtual, Void, Volatile, While,
            ],
        )
        .bucket(
            HCode::Literal,
            [
                LiteralAccess,
                IntegerLiteral,
                HexIntegerLiteral,
                BinIntegerLiteral,
                RealLiteral,
                Null,
                True,
                False,
            ],
        )
        .bucket(
            HCode::CharStringLiteral,
            [
                String,
                CharacterLiteral,
                RegularString,
                RegularStringInside,
                VerbatiumString,
                VerbatiumInsideString,
                InterpolationString,
                InterpolatedRegularStringStart,
                InterpolatedVerbatiumStringStart,
                DoubleQuoteInside,
                RegularCharInside,
            ],
        )
        .bucket(
            HCode::Comment,
            [
                SingleLineDocComment,
                EmptyDelimitedDocComment,
                DelimitedDocComment,
                SingleLineComment,
                DelimitedComment,
            ],
        )
        .soft_keywords(Rule::Identifier, SOFT_KEYWORDS)
        .directives(HCode::Comment, [DirectiveSrc])
        .build()
});

pub struct CSharpRules;

impl RuleCatalog for CSharpRules {
    fn name(&self) -> &'static str {
        "csharp"
    }

    fn on_exit(&self, node: NodeRef<'_>, overrides: &mut OverrideSet) {
        let Some(rule) = node.rule().and_then(Rule::from_id) else {
            return;
        };
        match rule {
            Rule::LocalVariableDeclarator
            | Rule::VariableDeclarator
            | Rule::ConstantDeclarator
            | Rule::FixedPointerDeclarator
            | Rule::LetClause => first_identifier(node, overrides, rule, HCode::VariableDeclarator),

            Rule::ClassDefinition
            | Rule::StructDefinition
            | Rule::InterfaceDefinition
            | Rule::EnumDefinition => first_identifier(node, overrides, rule, HCode::ClassDeclarator),

            Rule::NamespaceDeclaration => {
                if let Some(name) = node.first_child_of(Rule::QualifiedIdentifier) {
                    Scan::production(Rule::Identifier).assign(
                        name,
                        overrides,
                        rule,
                        HCode::ClassDeclarator,
                    );
                }
            }

            Rule::DelegateDefinition | Rule::DestructorDefinition | Rule::MethodMemberName => {
                first_identifier(node, overrides, rule, HCode::FunctionDeclarator)
            }

            Rule::LocalFunctionHeader | Rule::ConstructorDeclaration | Rule::LabeledStatement => {
                direct_identifier(node, overrides, rule, HCode::FunctionDeclarator)
            }

            Rule::EventDeclaration => {
                if let Some(member) = node.first_child_of(Rule::MemberName) {
                    for identifier in member.descendants_of(Rule::Identifier) {
                        overrides.assign(identifier, HCode::ClassDeclarator, rule);
                    }
                }
            }

            // Also reaches the identifiers of a qualified_alias_member child.
            Rule::NamespaceOrTypeName => {
                Scan::production(Rule::Identifier).assign(
                    node,
                    overrides,
                    rule,
                    HCode::TypeIdentifier,
                );
            }

            Rule::VariantTypeParameter | Rule::TypeParameter => {
                first_identifier(node, overrides, rule, HCode::TypeIdentifier)
            }

            Rule::TypeParameterConstraintsClause | Rule::UsingAliasDirective => {
                direct_identifier(node, overrides, rule, HCode::TypeIdentifier)
            }

            Rule::PrimaryExpression => primary_expression(node, overrides),

            Rule::MemberAccess => direct_identifier(node, overrides, rule, HCode::FieldIdentifier),

            Rule::QualifiedAliasMember => {
                if let Some(member) = node.nth_child_of(Rule::Identifier, 1) {
                    overrides.assign(member, HCode::FieldIdentifier, rule);
                }
            }

            _ => {}
        }
    }
}

fn first_identifier(node: NodeRef<'_>, overrides: &mut OverrideSet, origin: Rule, hcode: HCode) {
    Scan::production(Rule::Identifier)
        .first_only()
        .assign(node, overrides, origin, hcode);
}

fn direct_identifier(node: NodeRef<'_>, overrides: &mut OverrideSet, origin: Rule, hcode: HCode) {
    if let Some(identifier) = node.first_child_of(Rule::Identifier) {
        overrides.assign(identifier, hcode, origin);
    }
}

/// Marks the subject of every `method_invocation` in a primary expression chain.
///
/// The subject is the element right before the invocation: a member access, a
/// qualified alias member or the expression start, all of whose identifiers become
/// FUNCTION_IDENTIFIER. An `alias::name` start contributes only its `name`.
fn primary_expression(node: NodeRef<'_>, overrides: &mut OverrideSet) {
    let subjects = [
        RuleId::from(Rule::MemberAccess),
        RuleId::from(Rule::QualifiedAliasMember),
        RuleId::from(Rule::PrimaryExpressionStart),
    ];
    let mut fringe: Vec<NodeRef<'_>> = Vec::new();

    for child in node.children() {
        if child.is_rule(Rule::MethodInvocation) {
            if let Some(last) = fringe.last().copied() {
                if last.is_any_rule(&subjects) {
                    Scan::production(Rule::Identifier).assign(
                        last,
                        overrides,
                        Rule::PrimaryExpression,
                        HCode::FunctionIdentifier,
                    );
                } else if last.is_rule(Rule::Identifier) {
                    overrides.assign(last, HCode::FunctionIdentifier, Rule::MethodInvocation);
                }
            }
        }

        let aliased = child
            .is_rule(Rule::PrimaryExpressionStart)
            .then(|| child.child(0))
            .flatten()
            .filter(|start| start.is_rule(Rule::QualifiedAliasMember))
            .and_then(|alias| alias.child(2))
            .filter(|name| name.is_rule(Rule::Identifier));
        fringe.push(aliased.unwrap_or(child));
    }
}
