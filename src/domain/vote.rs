use std::fmt;

use crate::errors::code_error::{CodeError, CodeErrorResp, code_err};
use crate::proto::voting::{VotingRequest, voting_request::Vote};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn from_wire(tag: i32) -> Result<Self, CodeErrorResp> {
        Vote::try_from(tag).map(VoteDirection::from).map_err(|_| {
            code_err(
                CodeError::VOTE_DIRECTION_INVALID,
                format!("unrecognized vote tag {tag}"),
            )
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "UP",
            VoteDirection::Down => "DOWN",
        }
    }
}

impl From<VoteDirection> for Vote {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => Vote::Up,
            VoteDirection::Down => Vote::Down,
        }
    }
}

impl From<Vote> for VoteDirection {
    fn from(vote: Vote) -> Self {
        match vote {
            Vote::Up => VoteDirection::Up,
            Vote::Down => VoteDirection::Down,
        }
    }
}

impl fmt::Display for VoteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request that passed validation: the url is non-empty and the direction is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    url: String,
    direction: VoteDirection,
}

impl Ballot {
    pub fn new(url: impl Into<String>, direction: VoteDirection) -> Result<Self, CodeErrorResp> {
        let url = url.into();
        if url.is_empty() {
            return Err(CodeError::VOTE_URL_EMPTY.into());
        }
        Ok(Ballot { url, direction })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn direction(&self) -> VoteDirection {
        self.direction
    }

    pub fn confirmation(&self) -> String {
        match self.direction {
            VoteDirection::Up => format!("Happy to confirm that you upvoted for {}", self.url),
            VoteDirection::Down => format!("Confirmation that you downvoted for {}", self.url),
        }
    }
}

impl TryFrom<VotingRequest> for Ballot {
    type Error = CodeErrorResp;

    // url is checked before the tag so an empty url always reports the same error
    fn try_from(request: VotingRequest) -> Result<Self, Self::Error> {
        if request.url.is_empty() {
            return Err(CodeError::VOTE_URL_EMPTY.into());
        }
        let direction = VoteDirection::from_wire(request.vote)?;
        Ok(Ballot {
            url: request.url,
            direction,
        })
    }
}
