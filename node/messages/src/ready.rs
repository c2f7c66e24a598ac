// Copyright (C) ggpoker contributors.
// This file is part of the ggpoker library.

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at:

// http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::{expect_empty, MessageTrait};
use bytes::BytesMut;
use std::io::{self, Write};

/// Marks a seated player as ready to start the next hand. Carries no
/// payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ready;

impl MessageTrait for Ready {
    fn name(&self) -> &'static str {
        "ready"
    }

    fn serialize<W: Write>(&self, _writer: W) -> io::Result<()> {
        Ok(())
    }

    fn deserialize(bytes: BytesMut) -> io::Result<Self> {
        expect_empty(&bytes)?;
        Ok(Self)
    }
}
